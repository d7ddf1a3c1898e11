use reqwest::{Client, Url, header::ACCEPT};
use serde::Deserialize;

use crate::config::GitLabSettings;
use crate::domain::ticket::{GitLink, GitLinkKind};
use crate::error::{AppError, AppResult};

const UNKNOWN: &str = "Unknown";

/// Looks up merge requests and commits on a GitLab instance to fill in
/// link status, title and author.
pub struct GitLabClient {
    http: Client,
    settings: GitLabSettings,
}

/// Where a link lives on the configured instance.
#[derive(Debug, PartialEq, Eq)]
enum GitLabTarget {
    MergeRequest { project: String, iid: String },
    Commit { project: String, sha: String },
}

impl GitLabClient {
    pub fn new(settings: GitLabSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token().is_some()
    }

    fn token(&self) -> Option<&str> {
        self.settings.token.as_deref().filter(|token| !token.is_empty())
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4/{path}", self.base_url())
    }

    fn target(&self, url: &str) -> Option<GitLabTarget> {
        let base = Url::parse(self.base_url()).ok()?;
        let link = Url::parse(url).ok()?;
        if link.host_str() != base.host_str()
            || link.port_or_known_default() != base.port_or_known_default()
        {
            return None;
        }

        let segments: Vec<&str> = link.path_segments()?.filter(|s| !s.is_empty()).collect();
        let marker = segments.iter().position(|segment| *segment == "-")?;
        if marker == 0 {
            return None;
        }
        let project = segments[..marker].join("%2F");

        match (segments.get(marker + 1), segments.get(marker + 2)) {
            (Some(&"merge_requests"), Some(iid)) => Some(GitLabTarget::MergeRequest {
                project,
                iid: iid.to_string(),
            }),
            (Some(&"commit"), Some(sha)) => Some(GitLabTarget::Commit {
                project,
                sha: sha.to_string(),
            }),
            _ => None,
        }
    }

    /// Returns `link` with status, title and author filled in. Merge
    /// requests and commits that cannot be looked up keep their kind and
    /// report an `Unknown` status.
    pub async fn enrich(&self, link: GitLink) -> GitLink {
        match link.kind {
            GitLinkKind::MergeRequest | GitLinkKind::Commit => {}
            _ => return link.with_status("Active"),
        }

        let target = match self.target(&link.url) {
            Some(target) if self.is_configured() => target,
            _ => return link.with_status(UNKNOWN),
        };

        match self.lookup(&target).await {
            Ok(details) => GitLink {
                status: Some(details.status),
                title: Some(details.title),
                author: Some(details.author),
                ..link
            },
            Err(err) => {
                tracing::warn!(url = %link.url, "GitLab lookup failed: {err}");
                link.with_status(UNKNOWN)
            }
        }
    }

    async fn lookup(&self, target: &GitLabTarget) -> AppResult<LinkDetails> {
        match target {
            GitLabTarget::MergeRequest { project, iid } => {
                let url = self.api_url(&format!("projects/{project}/merge_requests/{iid}"));
                let mr: MergeRequest = self.get(url).await?.json().await.map_err(parse_error)?;
                Ok(LinkDetails {
                    status: capitalize(&mr.state),
                    title: mr.title,
                    author: mr
                        .author
                        .map(|author| author.name)
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                })
            }
            GitLabTarget::Commit { project, sha } => {
                let url = self.api_url(&format!("projects/{project}/repository/commits/{sha}"));
                let commit: Commit = self.get(url).await?.json().await.map_err(parse_error)?;
                Ok(LinkDetails {
                    status: "Committed".to_string(),
                    title: commit.title,
                    author: commit.author_name,
                })
            }
        }
    }

    async fn get(&self, url: String) -> AppResult<reqwest::Response> {
        let token = self
            .token()
            .ok_or_else(|| AppError::Configuration("GitLab token not configured".to_string()))?;

        let response = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Network(format!("failed to call GitLab: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!("GitLab responded with {status}")));
        }
        Ok(response)
    }
}

fn parse_error(err: reqwest::Error) -> AppError {
    AppError::Analysis(format!("failed to parse GitLab response: {err}"))
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => UNKNOWN.to_string(),
    }
}

struct LinkDetails {
    status: String,
    title: String,
    author: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    title: String,
    state: String,
    #[serde(default)]
    author: Option<GitLabUser>,
}

#[derive(Deserialize)]
struct GitLabUser {
    name: String,
}

#[derive(Deserialize)]
struct Commit {
    title: String,
    author_name: String,
}
