use async_trait::async_trait;

use crate::domain::demo::{DEMO_ROOT_KEY, demo_ticket_tree};
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::{CapabilityStatus, TicketGraphSource};

/// Serves the built-in demonstration tree without touching the network.
pub struct DemoSource;

#[async_trait]
impl TicketGraphSource for DemoSource {
    async fn probe(&self) -> AppResult<CapabilityStatus> {
        Ok(CapabilityStatus {
            jira_configured: true,
            gitlab_configured: true,
        })
    }

    async fn fetch_graph(&self, ticket_id: &str) -> AppResult<Ticket> {
        if ticket_id.trim().eq_ignore_ascii_case(DEMO_ROOT_KEY) {
            Ok(demo_ticket_tree())
        } else {
            Err(AppError::NotFound(format!(
                "{ticket_id} (demo mode only knows {DEMO_ROOT_KEY})"
            )))
        }
    }
}
