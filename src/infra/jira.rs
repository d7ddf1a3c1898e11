use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use crate::config::{GitLabSettings, JiraSettings};
use crate::domain::git_link::extract_git_links;
use crate::domain::ticket::{GitLink, Ticket, TicketType};
use crate::error::{AppError, AppResult};
use crate::infra::gitlab::GitLabClient;
use crate::services::{CapabilityStatus, TicketGraphSource};

const MAX_BUILD_DEPTH: usize = 10;
const CHILD_SEARCH_LIMIT: u32 = 100;
const ISSUE_FIELDS: &str = "summary,status,issuetype,assignee,reporter,description";

/// Builds ticket graphs straight from Jira's REST API, following
/// parent and epic links and scraping git links out of comments.
pub struct JiraClient {
    http: Client,
    jira: JiraSettings,
    gitlab: GitLabClient,
}

type BuildFuture<'a> = Pin<Box<dyn Future<Output = Ticket> + Send + 'a>>;

impl JiraClient {
    pub fn new(jira: JiraSettings, gitlab: GitLabSettings) -> Self {
        Self {
            http: Client::new(),
            jira,
            gitlab: GitLabClient::new(gitlab),
        }
    }

    fn credentials(&self) -> AppResult<(&str, &str)> {
        let username = self
            .jira
            .username
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira username not configured".to_string()))?;
        let token = self
            .jira
            .api_token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira API token not configured".to_string()))?;
        Ok((username, token))
    }

    fn auth_header(username: &str, token: &str) -> String {
        let encoded = BASE64_STANDARD.encode(format!("{username}:{token}"));
        format!("Basic {encoded}")
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.jira.base_url.trim_end_matches('/'))
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.jira.base_url.trim_end_matches('/'))
    }

    async fn get(&self, url: String) -> AppResult<reqwest::Response> {
        let (username, token) = self.credentials()?;
        self.http
            .get(url)
            .header(AUTHORIZATION, Self::auth_header(username, token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Network(format!("failed to call Jira: {err}")))
    }

    async fn fetch_issue(&self, key: &str) -> AppResult<JiraIssue> {
        let url = format!("{}?fields={ISSUE_FIELDS}", self.api_url(&format!("issue/{key}")));
        let response = self.get(url).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Network(format!("Jira responded with {status}")));
        }
        response
            .json()
            .await
            .map_err(|err| AppError::Analysis(format!("failed to parse Jira issue {key}: {err}")))
    }

    async fn search_children(&self, key: &str) -> AppResult<Vec<JiraIssue>> {
        let (username, token) = self.credentials()?;
        let request = SearchRequest {
            jql: format!("parent = {key} OR \"Epic Link\" = {key}"),
            max_results: CHILD_SEARCH_LIMIT,
            fields: ISSUE_FIELDS.split(',').collect(),
        };

        let response = self
            .http
            .post(self.api_url("search"))
            .header(AUTHORIZATION, Self::auth_header(username, token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| AppError::Network(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Jira search responded with {status}"
            )));
        }
        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|err| AppError::Analysis(format!("failed to parse Jira search: {err}")))?;
        Ok(payload.issues)
    }

    async fn fetch_comments(&self, key: &str) -> AppResult<Vec<JiraComment>> {
        let response = self.get(self.api_url(&format!("issue/{key}/comment"))).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Jira comments responded with {status}"
            )));
        }
        let page: CommentPage = response
            .json()
            .await
            .map_err(|err| AppError::Analysis(format!("failed to parse Jira comments: {err}")))?;
        Ok(page.comments)
    }

    async fn collect_git_links(&self, issue: &JiraIssue) -> Vec<GitLink> {
        let mut found = Vec::new();

        match self.fetch_comments(&issue.key).await {
            Ok(comments) => {
                for comment in comments {
                    let author = display_name(comment.author.as_ref());
                    for url in extract_git_links(comment.body.as_deref().unwrap_or_default()) {
                        found.push(GitLink::new(url, author.as_str()));
                    }
                }
            }
            Err(err) => tracing::warn!(key = %issue.key, "failed to fetch comments: {err}"),
        }

        if let Some(description) = issue.fields.description.as_deref() {
            let reporter = display_name(issue.fields.reporter.as_ref());
            for url in extract_git_links(description) {
                found.push(GitLink::new(url, reporter.as_str()));
            }
        }

        let mut links = Vec::with_capacity(found.len());
        for link in found {
            links.push(self.gitlab.enrich(link).await);
        }
        links
    }

    fn to_ticket(&self, issue: &JiraIssue) -> Ticket {
        let mut ticket = Ticket::new(
            &issue.key,
            TicketType::from(issue.fields.issuetype.name.clone()),
            &issue.fields.summary,
            &self.browse_url(&issue.key),
        )
        .with_status(&issue.fields.status.name);
        ticket.assignee = issue
            .fields
            .assignee
            .as_ref()
            .map(|user| user.display_name.clone());
        ticket
    }

    /// A key already on `path` comes back as a bare leaf so the graph stays
    /// finite; the analyzer flags it afterwards.
    fn build_node<'a>(
        &'a self,
        issue: JiraIssue,
        depth: usize,
        path: &'a mut Vec<String>,
    ) -> BuildFuture<'a> {
        Box::pin(async move {
            let mut ticket = self.to_ticket(&issue);
            if path.contains(&issue.key) {
                return ticket;
            }

            ticket.git_links = self.collect_git_links(&issue).await;
            if depth >= MAX_BUILD_DEPTH {
                tracing::debug!(key = %issue.key, depth, "depth limit reached");
                return ticket;
            }

            let children = match self.search_children(&issue.key).await {
                Ok(children) => children,
                Err(err) => {
                    tracing::warn!(key = %issue.key, "failed to fetch children: {err}");
                    Vec::new()
                }
            };

            path.push(issue.key.clone());
            for child in children {
                let node = self.build_node(child, depth + 1, path).await;
                ticket.children.push(node);
            }
            path.pop();

            ticket
        })
    }
}

fn display_name(user: Option<&JiraUser>) -> String {
    user.map(|user| user.display_name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[async_trait]
impl TicketGraphSource for JiraClient {
    async fn probe(&self) -> AppResult<CapabilityStatus> {
        Ok(CapabilityStatus {
            jira_configured: self.credentials().is_ok(),
            gitlab_configured: self.gitlab.is_configured(),
        })
    }

    async fn fetch_graph(&self, ticket_id: &str) -> AppResult<Ticket> {
        let root = self.fetch_issue(ticket_id.trim()).await?;
        tracing::debug!(key = %root.key, "building ticket graph from Jira");

        let mut path = Vec::new();
        Ok(self.build_node(root, 0, &mut path).await)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: String,
    max_results: u32,
    fields: Vec<&'a str>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraIssueFields,
}

#[derive(Deserialize)]
struct JiraIssueFields {
    summary: String,
    status: JiraNamed,
    issuetype: JiraNamed,
    #[serde(default)]
    assignee: Option<JiraUser>,
    #[serde(default)]
    reporter: Option<JiraUser>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct JiraNamed {
    name: String,
}

#[derive(Deserialize)]
struct JiraUser {
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Deserialize)]
struct CommentPage {
    #[serde(default)]
    comments: Vec<JiraComment>,
}

#[derive(Deserialize)]
struct JiraComment {
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    author: Option<JiraUser>,
}
