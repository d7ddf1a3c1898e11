use crate::analysis::{CyclePolicy, analyze_tree};
use crate::context::AppContext;
use crate::domain::demo::demo_ticket_tree;
use crate::domain::summary::AnalysisResult;
use crate::error::AppResult;
use crate::workflow::analysis::analyze_ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Analyzing { ticket_id: String },
    Success(AnalysisResult),
    Error { message: String, retryable: bool },
}

/// Owns the display-facing state of ticket analyses. Every `begin` issues
/// a fresh token and only the outcome carrying the latest token lands;
/// anything older is dropped.
#[derive(Debug)]
pub struct AnalysisSession {
    state: AnalysisState,
    latest: u64,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
            latest: 0,
        }
    }

    pub fn into_state(self) -> AnalysisState {
        self.state
    }

    pub fn begin(&mut self, ticket_id: &str) -> RequestToken {
        self.latest += 1;
        self.state = AnalysisState::Analyzing {
            ticket_id: ticket_id.trim().to_string(),
        };
        RequestToken(self.latest)
    }

    /// Applies `outcome` if `token` is still current. Returns whether it did.
    pub fn complete(&mut self, token: RequestToken, outcome: AppResult<AnalysisResult>) -> bool {
        if token.0 != self.latest {
            tracing::debug!(
                token = token.0,
                latest = self.latest,
                "discarding stale analysis outcome"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => AnalysisState::Success(result),
            Err(error) => AnalysisState::Error {
                message: error.to_string(),
                retryable: error.is_retryable(),
            },
        };
        true
    }

    /// Shows the demo fixture, superseding anything still in flight.
    pub fn show_demo(&mut self, policy: CyclePolicy) {
        self.latest += 1;
        self.state = match analyze_tree(demo_ticket_tree(), policy) {
            Ok(result) => AnalysisState::Success(result),
            Err(error) => AnalysisState::Error {
                message: error.to_string(),
                retryable: false,
            },
        };
    }

    pub async fn run(
        &mut self,
        ctx: &AppContext,
        ticket_id: &str,
        policy: CyclePolicy,
    ) -> &AnalysisState {
        let token = self.begin(ticket_id);
        let outcome = analyze_ticket(ctx, ticket_id, policy).await;
        self.complete(token, outcome);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::AppError;
    use crate::workflow::analysis::tests::{StubSource, context_with};

    fn demo_result() -> AnalysisResult {
        analyze_tree(demo_ticket_tree(), CyclePolicy::AncestorPath).unwrap()
    }

    #[test]
    fn starts_idle_and_enters_analyzing() {
        let mut session = AnalysisSession::new();
        assert_eq!(&session.state, &AnalysisState::Idle);

        session.begin(" PROJ-1 ");
        assert_eq!(
            &session.state,
            &AnalysisState::Analyzing {
                ticket_id: "PROJ-1".to_string()
            }
        );
    }

    #[test]
    fn latest_request_wins_over_slow_earlier_one() {
        let mut session = AnalysisSession::new();
        let first = session.begin("PROJ-1");
        let second = session.begin("PROJ-2");

        assert!(session.complete(second, Ok(demo_result())));
        assert!(!session.complete(first, Err(AppError::Network("timeout".to_string()))));
        assert!(matches!(&session.state, AnalysisState::Success(_)));
    }

    #[test]
    fn network_failures_are_marked_retryable() {
        let mut session = AnalysisSession::new();
        let token = session.begin("PROJ-1");
        session.complete(token, Err(AppError::Network("connection reset".to_string())));
        assert!(matches!(
            &session.state,
            AnalysisState::Error { retryable: true, .. }
        ));
    }

    #[test]
    fn errors_become_messages() {
        let mut session = AnalysisSession::new();
        let token = session.begin("PROJ-404");
        session.complete(token, Err(AppError::NotFound("PROJ-404".to_string())));
        assert_eq!(
            &session.state,
            &AnalysisState::Error {
                message: "ticket not found: PROJ-404".to_string(),
                retryable: false,
            }
        );
    }

    #[test]
    fn demo_supersedes_in_flight_request() {
        let mut session = AnalysisSession::new();
        let token = session.begin("PROJ-1");
        session.show_demo(CyclePolicy::AncestorPath);

        assert!(!session.complete(token, Err(AppError::Network("late".to_string()))));
        match &session.state {
            AnalysisState::Success(result) => {
                assert_eq!(result.root().unwrap().key, "PROJ-1234");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_drives_to_terminal_state() {
        let ctx = context_with(Arc::new(StubSource::ready(|| Ok(demo_ticket_tree()))));
        let mut session = AnalysisSession::new();

        let state = session.run(&ctx, "PROJ-1234", CyclePolicy::AncestorPath).await;
        assert!(matches!(state, AnalysisState::Success(result) if result.summary.total_tickets == 8));
    }
}
