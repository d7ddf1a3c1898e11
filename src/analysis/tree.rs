use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use crate::domain::summary::{AnalysisResult, AnalysisSummary};
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};

pub const CYCLIC_REFERENCE_MESSAGE: &str =
    "Cyclic reference detected - this ticket was already processed at a higher level";

/// Decides when a repeated ticket key counts as a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    /// The key is already on the root-to-node path. A key reached again
    /// through a sibling branch is walked but not counted twice.
    #[default]
    AncestorPath,
    /// The key was visited anywhere earlier in the walk.
    AnyVisited,
}

impl CyclePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePolicy::AncestorPath => "path",
            CyclePolicy::AnyVisited => "visited",
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "path" | "ancestor" | "ancestor-path" => Ok(CyclePolicy::AncestorPath),
            "visited" | "any" | "any-visited" => Ok(CyclePolicy::AnyVisited),
            other => Err(format!("unknown cycle policy '{other}' (expected path or visited)")),
        }
    }
}

/// Walks the tree rooted at `root`, marks cyclic slots in place and
/// computes the summary. The tree is validated up front, so a malformed
/// payload is rejected before any node is annotated.
pub fn analyze_tree(mut root: Ticket, policy: CyclePolicy) -> AppResult<AnalysisResult> {
    validate_tree(&root)?;

    let mut walk = TreeWalk::new(policy);
    walk.visit(&mut root, 0);
    let summary = walk.into_summary();

    tracing::debug!(
        root = %root.key,
        total_tickets = summary.total_tickets,
        cyclic = summary.cyclic_references.len(),
        "ticket tree analyzed"
    );

    Ok(AnalysisResult {
        summary,
        tickets: vec![root],
    })
}

pub fn validate_tree(root: &Ticket) -> AppResult<()> {
    let mut pending = vec![(root, root.key.clone())];

    while let Some((ticket, path)) = pending.pop() {
        if ticket.key.trim().is_empty() {
            return Err(AppError::Analysis(format!("ticket at {path} has no key")));
        }
        if ticket.ticket_type.is_blank() {
            return Err(AppError::Analysis(format!(
                "ticket {} at {path} has no type",
                ticket.key
            )));
        }
        if let Some(index) = ticket
            .git_links
            .iter()
            .position(|link| link.url.trim().is_empty())
        {
            return Err(AppError::Analysis(format!(
                "git link #{index} on ticket {} has no url",
                ticket.key
            )));
        }

        for (index, child) in ticket.children.iter().enumerate() {
            let label = if child.key.is_empty() {
                format!("[{index}]")
            } else {
                child.key.clone()
            };
            pending.push((child, format!("{path} > {label}")));
        }
    }

    Ok(())
}

struct TreeWalk {
    policy: CyclePolicy,
    ancestors: Vec<String>,
    visited: HashSet<String>,
    link_urls: HashSet<String>,
    max_depth: usize,
    cyclic: Vec<String>,
    breakdown: BTreeMap<String, usize>,
}

impl TreeWalk {
    fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            ancestors: Vec::new(),
            visited: HashSet::new(),
            link_urls: HashSet::new(),
            max_depth: 0,
            cyclic: Vec::new(),
            breakdown: BTreeMap::new(),
        }
    }

    fn is_cycle(&self, key: &str) -> bool {
        match self.policy {
            CyclePolicy::AncestorPath => self.ancestors.iter().any(|ancestor| ancestor == key),
            CyclePolicy::AnyVisited => self.visited.contains(key),
        }
    }

    fn visit(&mut self, ticket: &mut Ticket, depth: usize) {
        if self.is_cycle(&ticket.key) {
            self.mark_cyclic(ticket);
            return;
        }

        // Upstream payloads may carry their own markers; only this walk decides.
        ticket.cyclic_reference = false;
        ticket.error = None;
        self.max_depth = self.max_depth.max(depth);
        if self.visited.insert(ticket.key.clone()) {
            *self
                .breakdown
                .entry(ticket.ticket_type.as_str().to_string())
                .or_default() += 1;
        }
        for link in &ticket.git_links {
            self.link_urls.insert(link.url.clone());
        }

        self.ancestors.push(ticket.key.clone());
        for child in &mut ticket.children {
            self.visit(child, depth + 1);
        }
        self.ancestors.pop();
    }

    fn mark_cyclic(&mut self, ticket: &mut Ticket) {
        tracing::debug!(key = %ticket.key, "cyclic reference detected");
        ticket.cyclic_reference = true;
        ticket.error = Some(CYCLIC_REFERENCE_MESSAGE.to_string());
        ticket.children.clear();
        if !self.cyclic.contains(&ticket.key) {
            self.cyclic.push(ticket.key.clone());
        }
    }

    fn into_summary(self) -> AnalysisSummary {
        AnalysisSummary {
            total_tickets: self.visited.len(),
            total_git_links: self.link_urls.len(),
            max_depth: self.max_depth,
            has_cyclic_references: !self.cyclic.is_empty(),
            cyclic_references: self.cyclic,
            ticket_type_breakdown: self.breakdown,
        }
    }
}
