use std::fmt;

use crate::analysis::CyclePolicy;
use crate::context::AppContext;
use crate::domain::summary::{AnalysisResult, AnalysisSummary};
use crate::domain::ticket::{GitLink, Ticket};
use crate::error::AppResult;
use crate::workflow::session::{AnalysisSession, AnalysisState};

#[derive(Debug, Clone)]
pub struct AnalyzeCommandArgs {
    /// `None` shows the demo fixture.
    pub ticket_id: Option<String>,
    pub policy: CyclePolicy,
}

pub async fn run(ctx: &AppContext, args: AnalyzeCommandArgs) -> AnalysisState {
    let mut session = AnalysisSession::new();
    match args.ticket_id {
        Some(ticket_id) => {
            session.run(ctx, &ticket_id, args.policy).await;
        }
        None => session.show_demo(args.policy),
    }
    session.into_state()
}

/// Prints the terminal state. Returns `false` when the analysis failed.
pub fn report(state: &AnalysisState, json: bool) -> AppResult<bool> {
    match state {
        AnalysisState::Success(result) if json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(true)
        }
        AnalysisState::Success(result) => {
            print!("{}", render_result(result));
            Ok(true)
        }
        AnalysisState::Error { message, retryable } => {
            eprintln!("Error: {message}");
            if *retryable {
                eprintln!("This looks transient; run the command again to retry.");
            }
            Ok(false)
        }
        AnalysisState::Idle | AnalysisState::Analyzing { .. } => Ok(false),
    }
}

pub fn render_result(result: &AnalysisResult) -> String {
    TreeReport(result).to_string()
}

struct TreeReport<'a>(&'a AnalysisResult);

impl fmt::Display for TreeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        if let Some(root) = result.root() {
            writeln!(f, "Ticket analysis for {}", root.key)?;
        }
        write_summary(f, &result.summary)?;
        writeln!(f)?;
        for ticket in &result.tickets {
            write_ticket(f, ticket, 0)?;
        }
        Ok(())
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, summary: &AnalysisSummary) -> fmt::Result {
    let breakdown = summary
        .ticket_type_breakdown
        .iter()
        .map(|(name, count)| format!("{name} {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(f, "  Tickets:      {}", summary.total_tickets)?;
    writeln!(f, "  Git links:    {} unique", summary.total_git_links)?;
    writeln!(f, "  Max depth:    {}", summary.max_depth)?;
    writeln!(
        f,
        "  Ticket types: {} ({breakdown})",
        summary.unique_ticket_types()
    )?;
    if summary.has_cyclic_references {
        writeln!(f, "  Cyclic refs:  {}", summary.cyclic_references.join(", "))?;
    }
    Ok(())
}

fn write_ticket(f: &mut fmt::Formatter<'_>, ticket: &Ticket, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let assignee = ticket.assignee.as_deref().unwrap_or("Unassigned");

    if ticket.cyclic_reference {
        writeln!(
            f,
            "{indent}{} [{}] {} [cyclic]",
            ticket.key, ticket.ticket_type, ticket.summary
        )?;
        if let Some(error) = &ticket.error {
            writeln!(f, "{indent}    ! {error}")?;
        }
        return Ok(());
    }

    writeln!(
        f,
        "{indent}{} [{}] {} ({}, {assignee})",
        ticket.key, ticket.ticket_type, ticket.summary, ticket.status
    )?;
    writeln!(f, "{indent}    {}", ticket.url)?;
    for link in &ticket.git_links {
        write_link(f, &indent, link)?;
    }
    for child in &ticket.children {
        write_ticket(f, child, depth + 1)?;
    }
    Ok(())
}

fn write_link(f: &mut fmt::Formatter<'_>, indent: &str, link: &GitLink) -> fmt::Result {
    write!(f, "{indent}    - {} {}", link.kind.as_str(), link.url)?;
    if let Some(status) = &link.status {
        write!(f, " [{status}]")?;
    }
    if let Some(title) = &link.title {
        write!(f, " \"{title}\"")?;
    }
    if let Some(author) = &link.author {
        write!(f, " author {author}")?;
    }
    match &link.commented_by {
        Some(by) => writeln!(f, " (by {by})"),
        None => writeln!(f),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::analyze_tree;
    use crate::domain::demo::demo_ticket_tree;
    use crate::domain::ticket::TicketType;
    use crate::error::AppError;
    use crate::workflow::analysis::tests::{StubSource, context_with};

    #[test]
    fn renders_summary_and_marks_cyclic_slot() {
        let result = analyze_tree(demo_ticket_tree(), CyclePolicy::AncestorPath).unwrap();
        let text = render_result(&result);

        assert!(text.starts_with("Ticket analysis for PROJ-1234\n"));
        assert!(text.contains("  Tickets:      8\n"));
        assert!(text.contains("  Git links:    11 unique\n"));
        assert!(text.contains("  Cyclic refs:  PROJ-1234\n"));
        assert!(text.contains(
            "    PROJ-1234 [Task] Link back to main epic (cyclic reference example) [cyclic]\n"
        ));
        assert!(text.contains("      ! Cyclic reference detected"));
        assert!(text.contains("  PROJ-1235 [User Story] Implement OAuth 2.0 Integration (Done, Jane Doe)\n"));
    }

    #[test]
    fn renders_link_metadata_when_present() {
        let mut link = GitLink::new("https://gitlab.com/t/a/-/merge_requests/4", "Jane Doe")
            .with_status("Merged");
        link.title = Some("Refresh tokens".to_string());
        let tree = Ticket::new("M-1", TicketType::Task, "Tokens", "https://jira/browse/M-1")
            .with_link(link)
            .with_link(GitLink::new("https://github.com/t/a/pull/2", "Tom"));
        let result = analyze_tree(tree, CyclePolicy::AncestorPath).unwrap();
        let text = render_result(&result);

        assert!(text.contains(
            "    - Merge Request https://gitlab.com/t/a/-/merge_requests/4 [Merged] \"Refresh tokens\" (by Jane Doe)\n"
        ));
        assert!(text.contains("    - Pull Request https://github.com/t/a/pull/2 (by Tom)\n"));
    }

    #[tokio::test]
    async fn run_without_ticket_id_shows_demo() {
        let source = Arc::new(StubSource::ready(|| {
            Err(AppError::Network("unreachable".to_string()))
        }));
        let ctx = context_with(source.clone());
        let state = run(
            &ctx,
            AnalyzeCommandArgs {
                ticket_id: None,
                policy: CyclePolicy::AncestorPath,
            },
        )
        .await;

        match state {
            AnalysisState::Success(result) => assert_eq!(result.summary.total_tickets, 8),
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(source.fetches.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_with_ticket_id_fetches_from_source() {
        let ctx = context_with(Arc::new(StubSource::ready(|| {
            Err(AppError::NotFound("PROJ-5".to_string()))
        })));
        let state = run(
            &ctx,
            AnalyzeCommandArgs {
                ticket_id: Some("PROJ-5".to_string()),
                policy: CyclePolicy::AncestorPath,
            },
        )
        .await;

        assert!(matches!(state, AnalysisState::Error { retryable: false, .. }));
    }

    #[test]
    fn json_output_uses_camel_case_contract() {
        let result = analyze_tree(demo_ticket_tree(), CyclePolicy::AncestorPath).unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["summary"]["totalTickets"], 8);
        assert_eq!(value["summary"]["hasCyclicReferences"], true);
        assert_eq!(value["summary"]["ticketTypeBreakdown"]["User Story"], 2);
        let slot = &value["tickets"][0]["children"][2]["children"][1];
        assert_eq!(slot["cyclicReference"], true);
        assert_eq!(slot["gitLinks"], serde_json::json!([]));
    }
}
