use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ticket::GitLinkKind;

// Matches GitLab (`/-/merge_requests/..`) and GitHub (`/pull/..`) style
// artifact URLs rooted at `host/group/project`.
static GIT_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)https?://[^/\s]+/[^/\s]+/[^/\s]+/(?:-/merge_requests/\d+|-/commit/[0-9a-f]+|-/(?:tree|blob|compare)/[^\s<>"'\])|]+|pull/\d+|commit/[0-9a-f]+|(?:tree|branch)/[^\s<>"'\])|]+)"#,
    )
    .expect("git link pattern is valid")
});

/// Finds source-control links in free text (comments, descriptions),
/// deduplicated and in order of first appearance.
pub fn extract_git_links(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    GIT_LINK_PATTERN
        .find_iter(text)
        .map(|found| found.as_str().trim_end_matches(['.', ',', ';', ':']).to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

impl GitLinkKind {
    pub fn classify(url: &str) -> Self {
        let lowered = url.to_lowercase();
        if lowered.contains("/merge_requests/") {
            GitLinkKind::MergeRequest
        } else if lowered.contains("/pull/") {
            GitLinkKind::PullRequest
        } else if lowered.contains("/commit/") {
            GitLinkKind::Commit
        } else if ["/tree/", "/branch/", "/blob/"]
            .iter()
            .any(|segment| lowered.contains(segment))
        {
            GitLinkKind::Branch
        } else {
            GitLinkKind::Other("Repository".to_string())
        }
    }
}
