use crate::context::AppContext;
use crate::error::AppResult;
use crate::services::CapabilityStatus;

pub async fn run(ctx: &AppContext) -> AppResult<CapabilityStatus> {
    ctx.ticket_source.probe().await
}

pub fn describe(status: &CapabilityStatus) -> String {
    let flag = |configured: bool| if configured { "configured" } else { "not configured" };
    let mut out = format!(
        "Jira:   {}\nGitLab: {}\n",
        flag(status.jira_configured),
        flag(status.gitlab_configured)
    );
    if !status.is_ready() {
        out.push_str("Ticket analysis needs both Jira and GitLab credentials.\n");
    }
    out
}
