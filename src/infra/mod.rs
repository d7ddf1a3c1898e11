pub mod dashboard;
pub mod demo;
pub mod gitlab;
pub mod jira;

pub use dashboard::DashboardClient;
pub use demo::DemoSource;
pub use jira::JiraClient;
