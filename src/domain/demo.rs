use crate::domain::ticket::{GitLink, Ticket, TicketType};

pub const DEMO_ROOT_KEY: &str = "PROJ-1234";

const BROWSE_BASE: &str = "https://company.atlassian.net/browse";

fn ticket(key: &str, ticket_type: TicketType, summary: &str, status: &str, assignee: &str) -> Ticket {
    Ticket::new(key, ticket_type, summary, &format!("{BROWSE_BASE}/{key}"))
        .with_status(status)
        .with_assignee(assignee)
}

/// Hardcoded authentication-overhaul epic used for demonstrations. The
/// last child of the session-timeout bug points back at the epic itself.
pub fn demo_ticket_tree() -> Ticket {
    let oauth_story = ticket(
        "PROJ-1235",
        TicketType::UserStory,
        "Implement OAuth 2.0 Integration",
        "Done",
        "Jane Doe",
    )
    .with_link(GitLink::new("https://github.com/company/auth-service/pull/123", "Jane Doe"))
    .with_link(GitLink::new("https://github.com/company/frontend/pull/789", "Jane Doe"))
    .with_link(GitLink::new("https://github.com/company/auth-service/pull/456", "Jane Doe"))
    .with_child(
        ticket("PROJ-1236", TicketType::Task, "Configure OAuth providers", "Done", "Mike Wilson")
            .with_link(GitLink::new(
                "https://github.com/company/config/commit/def789ghi012",
                "Mike Wilson",
            )),
    )
    .with_child(
        ticket(
            "PROJ-1237",
            TicketType::SubTask,
            "Update OAuth callback URLs",
            "Done",
            "Sarah Johnson",
        )
        .with_link(GitLink::new(
            "https://github.com/company/auth-service/commit/ghi345jkl678",
            "Sarah Johnson",
        )),
    );

    let mfa_story = ticket(
        "PROJ-1238",
        TicketType::UserStory,
        "Implement Multi-Factor Authentication",
        "In Progress",
        "Tom Brown",
    )
    .with_link(GitLink::new("https://github.com/company/auth-service/pull/234", "Tom Brown"))
    .with_child(
        ticket("PROJ-1239", TicketType::Task, "Integrate TOTP library", "In Progress", "Tom Brown")
            .with_link(GitLink::new(
                "https://github.com/company/auth-service/commit/jkl901mno234",
                "Tom Brown",
            )),
    );

    let mut back_link = ticket(
        DEMO_ROOT_KEY,
        TicketType::Task,
        "Link back to main epic (cyclic reference example)",
        "To Do",
        "System Admin",
    );
    back_link.url = format!("{BROWSE_BASE}/PROJ-1242");

    let session_bug = ticket(
        "PROJ-1240",
        TicketType::Bug,
        "Fix session timeout issues",
        "To Do",
        "Lisa Davis",
    )
    .with_child(
        ticket(
            "PROJ-1241",
            TicketType::SubTask,
            "Investigate session storage mechanism",
            "To Do",
            "Lisa Davis",
        )
        .with_link(GitLink::new(
            "https://github.com/company/auth-service/branch/session-debug",
            "Lisa Davis",
        )),
    )
    .with_child(back_link);

    ticket(
        DEMO_ROOT_KEY,
        TicketType::Epic,
        "User Authentication System Overhaul",
        "In Progress",
        "John Smith",
    )
    .with_link(GitLink::new("https://github.com/company/auth-service/pull/456", "John Smith"))
    .with_link(GitLink::new(
        "https://github.com/company/auth-service/commit/abc123def456",
        "John Smith",
    ))
    .with_link(GitLink::new(
        "https://github.com/company/auth-service/branch/feature/oauth-redesign",
        "John Smith",
    ))
    .with_link(GitLink::new("https://github.com/company/documentation/pull/78", "John Smith"))
    .with_child(oauth_story)
    .with_child(mfa_story)
    .with_child(session_bug)
}
