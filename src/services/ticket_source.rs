use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ticket::Ticket;
use crate::error::AppResult;

/// Which upstream integrations have credentials available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityStatus {
    #[serde(alias = "jiraConfigured")]
    pub jira_configured: bool,
    #[serde(alias = "gitlabConfigured")]
    pub gitlab_configured: bool,
}

impl CapabilityStatus {
    pub fn is_ready(&self) -> bool {
        self.jira_configured && self.gitlab_configured
    }
}

#[async_trait]
pub trait TicketGraphSource: Send + Sync {
    async fn probe(&self) -> AppResult<CapabilityStatus>;
    /// Returns the root of the ticket graph for `ticket_id`, unannotated.
    async fn fetch_graph(&self, ticket_id: &str) -> AppResult<Ticket>;
}
