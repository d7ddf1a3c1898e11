use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ticket::Ticket;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_tickets: usize,
    pub total_git_links: usize,
    pub max_depth: usize,
    pub has_cyclic_references: bool,
    pub cyclic_references: Vec<String>,
    pub ticket_type_breakdown: BTreeMap<String, usize>,
}

impl AnalysisSummary {
    pub fn unique_ticket_types(&self) -> usize {
        self.ticket_type_breakdown.len()
    }
}

/// The annotated tree plus its summary, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    pub tickets: Vec<Ticket>,
}

impl AnalysisResult {
    pub fn root(&self) -> Option<&Ticket> {
        self.tickets.first()
    }
}
