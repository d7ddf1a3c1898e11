use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{SourceKind, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring ticket-lens.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Tokens are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt("Ticket source (dashboard/jira)", &mut cfg.source, false)?;
    if let Some(source) = cfg.source.as_deref() {
        source.parse::<SourceKind>()?;
    }
    apply_prompt(
        "Dashboard URL (e.g., http://localhost:5000)",
        &mut cfg.dashboard_url,
        false,
    )?;
    apply_prompt(
        "Jira base URL (e.g., https://company.atlassian.net)",
        &mut cfg.jira_url,
        false,
    )?;
    apply_prompt("Jira username", &mut cfg.jira_username, false)?;
    apply_prompt("Jira API token", &mut cfg.jira_api_token, true)?;
    apply_prompt("GitLab URL", &mut cfg.gitlab_url, false)?;
    apply_prompt("GitLab token", &mut cfg.gitlab_token, true)?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Ticket source: {}", display_value(&cfg.source));
    println!("Dashboard URL: {}", display_value(&cfg.dashboard_url));
    println!("Jira base URL: {}", display_value(&cfg.jira_url));
    println!("Jira username: {}", display_value(&cfg.jira_username));
    println!("Jira API token: {}", mask_secret(&cfg.jira_api_token));
    println!("GitLab URL: {}", display_value(&cfg.gitlab_url));
    println!("GitLab token: {}", mask_secret(&cfg.gitlab_token));
    println!("(environment variables override these values)");

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::from_input(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn from_input(input: &str) -> Self {
        match input.trim() {
            "" => PromptAction::Keep,
            "-" => PromptAction::Clear,
            value => PromptAction::Set(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_long_and_short_secrets() {
        assert_eq!(mask_secret(&Some("glpat-abcdef123".to_string())), "glp***123");
        assert_eq!(mask_secret(&Some("abc".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn displays_unset_values() {
        assert_eq!(display_value(&Some(String::new())), "<not set>");
        assert_eq!(display_value(&Some("jira".to_string())), "jira");
    }

    #[test]
    fn interprets_prompt_input() {
        assert_eq!(PromptAction::from_input("\n"), PromptAction::Keep);
        assert_eq!(PromptAction::from_input(" - \n"), PromptAction::Clear);
        assert_eq!(
            PromptAction::from_input("https://jira.example.com\n"),
            PromptAction::Set("https://jira.example.com".to_string())
        );
    }
}
