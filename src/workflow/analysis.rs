use crate::analysis::{CyclePolicy, analyze_tree};
use crate::context::AppContext;
use crate::domain::summary::AnalysisResult;
use crate::error::{AppError, AppResult};

pub const CREDENTIALS_MISSING: &str =
    "API credentials not configured. Please set up Jira and GitLab API credentials.";

/// Probes the source, fetches the graph rooted at `ticket_id` and analyzes
/// it. Nothing is fetched unless both integrations report ready.
pub async fn analyze_ticket(
    ctx: &AppContext,
    ticket_id: &str,
    policy: CyclePolicy,
) -> AppResult<AnalysisResult> {
    let ticket_id = ticket_id.trim();
    if ticket_id.is_empty() {
        return Err(AppError::InvalidTicketId(
            "ticket id must not be empty".to_string(),
        ));
    }

    tracing::debug!(ticket_id, source = ctx.config.source.as_str(), "starting analysis");
    let capabilities = ctx.ticket_source.probe().await?;
    if !capabilities.is_ready() {
        tracing::debug!(?capabilities, "ticket source not ready");
        return Err(AppError::Configuration(CREDENTIALS_MISSING.to_string()));
    }

    let root = ctx.ticket_source.fetch_graph(ticket_id).await?;
    let result = analyze_tree(root, policy)?;

    tracing::info!(
        ticket_id,
        policy = policy.as_str(),
        total_tickets = result.summary.total_tickets,
        total_git_links = result.summary.total_git_links,
        max_depth = result.summary.max_depth,
        "analysis complete"
    );
    Ok(result)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::config::{AppConfig, StoredConfig};
    use crate::domain::demo::demo_ticket_tree;
    use crate::domain::ticket::Ticket;
    use crate::services::{CapabilityStatus, TicketGraphSource};

    pub(crate) struct StubSource {
        pub status: CapabilityStatus,
        pub fetches: AtomicUsize,
        pub graph: fn() -> AppResult<Ticket>,
    }

    impl StubSource {
        pub(crate) fn ready(graph: fn() -> AppResult<Ticket>) -> Self {
            Self {
                status: CapabilityStatus {
                    jira_configured: true,
                    gitlab_configured: true,
                },
                fetches: AtomicUsize::new(0),
                graph,
            }
        }
    }

    #[async_trait]
    impl TicketGraphSource for StubSource {
        async fn probe(&self) -> AppResult<CapabilityStatus> {
            Ok(self.status)
        }

        async fn fetch_graph(&self, _ticket_id: &str) -> AppResult<Ticket> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            (self.graph)()
        }
    }

    pub(crate) fn context_with(source: Arc<StubSource>) -> AppContext {
        let config = AppConfig::resolve(StoredConfig::default(), |_| None).unwrap();
        AppContext::new(config, source)
    }

    #[tokio::test]
    async fn analyzes_fetched_graph() {
        let source = Arc::new(StubSource::ready(|| Ok(demo_ticket_tree())));
        let ctx = context_with(source.clone());

        let result = analyze_ticket(&ctx, " PROJ-1234 ", CyclePolicy::AncestorPath)
            .await
            .unwrap();
        assert_eq!(result.summary.total_tickets, 8);
        assert!(result.summary.has_cyclic_references);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unconfigured_jira_fails_before_fetching() {
        let mut stub = StubSource::ready(|| Ok(demo_ticket_tree()));
        stub.status.jira_configured = false;
        let source = Arc::new(stub);
        let ctx = context_with(source.clone());

        let error = analyze_ticket(&ctx, "PROJ-1234", CyclePolicy::AncestorPath)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Configuration(message) if message == CREDENTIALS_MISSING));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_ticket_id_is_rejected() {
        let source = Arc::new(StubSource::ready(|| Ok(demo_ticket_tree())));
        let ctx = context_with(source.clone());

        assert!(matches!(
            analyze_ticket(&ctx, "   ", CyclePolicy::AncestorPath).await,
            Err(AppError::InvalidTicketId(_))
        ));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_errors_propagate_unchanged() {
        let source = Arc::new(StubSource::ready(|| {
            Err(AppError::NotFound("PROJ-9".to_string()))
        }));
        let ctx = context_with(source);

        assert!(matches!(
            analyze_ticket(&ctx, "PROJ-9", CyclePolicy::AncestorPath).await,
            Err(AppError::NotFound(_))
        ));
    }
}
