use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketType {
    Epic,
    UserStory,
    Task,
    SubTask,
    Bug,
    Defect,
    Other(String),
}

impl TicketType {
    pub fn as_str(&self) -> &str {
        match self {
            TicketType::Epic => "Epic",
            TicketType::UserStory => "User Story",
            TicketType::Task => "Task",
            TicketType::SubTask => "Sub-task",
            TicketType::Bug => "Bug",
            TicketType::Defect => "Defect",
            TicketType::Other(name) => name,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

/// Jira's `Story` and `Subtask` spellings are folded into `User Story`
/// and `Sub-task`, so the breakdown counts both sources under one name.
/// Any other name is kept verbatim.
impl From<String> for TicketType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Epic" => TicketType::Epic,
            "User Story" | "Story" => TicketType::UserStory,
            "Task" => TicketType::Task,
            "Sub-task" | "Subtask" => TicketType::SubTask,
            "Bug" => TicketType::Bug,
            "Defect" => TicketType::Defect,
            _ => TicketType::Other(value),
        }
    }
}

impl From<TicketType> for String {
    fn from(value: TicketType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GitLinkKind {
    PullRequest,
    MergeRequest,
    Commit,
    Branch,
    Other(String),
}

impl GitLinkKind {
    pub fn as_str(&self) -> &str {
        match self {
            GitLinkKind::PullRequest => "Pull Request",
            GitLinkKind::MergeRequest => "Merge Request",
            GitLinkKind::Commit => "Commit",
            GitLinkKind::Branch => "Branch",
            GitLinkKind::Other(name) => name,
        }
    }
}

impl From<String> for GitLinkKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pull Request" => GitLinkKind::PullRequest,
            "Merge Request" => GitLinkKind::MergeRequest,
            "Commit" => GitLinkKind::Commit,
            "Branch" => GitLinkKind::Branch,
            _ => GitLinkKind::Other(value),
        }
    }
}

impl From<GitLinkKind> for String {
    fn from(value: GitLinkKind) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitLink {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: GitLinkKind,
    #[serde(default)]
    pub commented_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl GitLink {
    pub fn new(url: impl Into<String>, commented_by: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: GitLinkKind::classify(&url),
            url,
            commented_by: Some(commented_by.into()),
            status: None,
            title: None,
            author: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub key: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub summary: String,
    pub status: String,
    #[serde(default)]
    pub assignee: Option<String>,
    pub url: String,
    #[serde(default)]
    pub children: Vec<Ticket>,
    #[serde(default)]
    pub git_links: Vec<GitLink>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cyclic_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ticket {
    pub fn new(key: &str, ticket_type: TicketType, summary: &str, url: &str) -> Self {
        Self {
            key: key.to_string(),
            ticket_type,
            summary: summary.to_string(),
            status: "To Do".to_string(),
            assignee: None,
            url: url.to_string(),
            children: Vec::new(),
            git_links: Vec::new(),
            cyclic_reference: false,
            error: None,
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn with_assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    pub fn with_link(mut self, link: GitLink) -> Self {
        self.git_links.push(link);
        self
    }

    pub fn with_child(mut self, child: Ticket) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_dashboard_ticket_shape() {
        let json = r#"{
            "key": "PROJ-1",
            "type": "User Story",
            "summary": "Login",
            "status": "Done",
            "assignee": null,
            "url": "https://company.atlassian.net/browse/PROJ-1",
            "gitLinks": [
                {"url": "https://github.com/company/app/pull/1", "type": "Pull Request", "commentedBy": "Jane Doe"}
            ]
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.ticket_type, TicketType::UserStory);
        assert!(ticket.children.is_empty());
        assert_eq!(ticket.git_links[0].kind, GitLinkKind::PullRequest);
        assert_eq!(ticket.git_links[0].commented_by.as_deref(), Some("Jane Doe"));
        assert!(!ticket.cyclic_reference);
    }

    #[test]
    fn folds_jira_type_spellings() {
        assert_eq!(TicketType::from("Story".to_string()).as_str(), "User Story");
        assert_eq!(TicketType::from("Subtask".to_string()).as_str(), "Sub-task");
        assert_eq!(TicketType::from("Sub-task".to_string()), TicketType::SubTask);
    }

    #[test]
    fn keeps_link_metadata_from_backend() {
        let json = r#"{
            "url": "https://gitlab.com/team/api/-/merge_requests/3",
            "type": "Merge Request",
            "status": "Merged",
            "title": "Add token refresh",
            "author": "Jane Doe"
        }"#;
        let link: GitLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.status.as_deref(), Some("Merged"));
        assert_eq!(link.title.as_deref(), Some("Add token refresh"));
        assert_eq!(link.author.as_deref(), Some("Jane Doe"));
        assert!(link.commented_by.is_none());

        let value = serde_json::to_value(GitLink::new("https://github.com/a/b/pull/1", "x")).unwrap();
        assert!(value.get("status").is_none());
    }

    #[test]
    fn rejects_ticket_without_key() {
        let json = r#"{"type": "Task", "summary": "x", "status": "To Do", "url": "u"}"#;
        assert!(serde_json::from_str::<Ticket>(json).is_err());
    }

    #[test]
    fn preserves_unknown_types_verbatim() {
        let ticket_type = TicketType::from("Spike".to_string());
        assert_eq!(ticket_type, TicketType::Other("Spike".to_string()));
        assert_eq!(String::from(ticket_type), "Spike");
    }

    #[test]
    fn omits_cycle_markers_when_unset() {
        let ticket = Ticket::new("PROJ-9", TicketType::Bug, "Crash", "https://x/browse/PROJ-9");
        let value = serde_json::to_value(&ticket).unwrap();
        assert!(value.get("cyclicReference").is_none());
        assert!(value.get("error").is_none());
        assert_eq!(value["type"], "Bug");
    }
}
