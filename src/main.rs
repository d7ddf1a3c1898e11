mod analysis;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::analysis::CyclePolicy;
use crate::cmd::analyze::{self as analyze_cmd, AnalyzeCommandArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::probe as probe_cmd;
use crate::config::{AppConfig, SourceKind};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::{DashboardClient, DemoSource, JiraClient};
use crate::services::TicketGraphSource;

#[derive(Parser)]
#[command(
    name = "ticket-lens",
    author,
    version,
    about = "Jira ticket dependency analyzer"
)]
struct Cli {
    /// Enable debug logging for this tool (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a ticket and its descendants for links and cycles.
    Analyze(AnalyzeArgs),
    /// Report whether Jira and GitLab credentials are configured.
    Probe(SourceArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Root ticket key, e.g. PROJ-1234.
    ticket_id: Option<String>,
    #[command(flatten)]
    source: SourceArgs,
    /// Print the result as JSON instead of a tree.
    #[arg(long)]
    json: bool,
    /// When a repeated key counts as a cycle: `path` or `visited`.
    #[arg(long, default_value = "path")]
    cycle_policy: CyclePolicy,
}

#[derive(Args)]
struct SourceArgs {
    /// Use the built-in demo tree instead of a live backend.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands) -> AppResult<bool> {
    match command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(true)
        }
        Commands::Probe(args) => {
            let context = build_context(args.demo)?;
            let status = probe_cmd::run(&context).await?;
            print!("{}", probe_cmd::describe(&status));
            Ok(status.is_ready())
        }
        Commands::Analyze(args) => run_analyze(args).await,
    }
}

async fn run_analyze(args: AnalyzeArgs) -> AppResult<bool> {
    if args.ticket_id.is_none() && !args.source.demo {
        return Err(AppError::InvalidTicketId(
            "a ticket id is required unless --demo is set".to_string(),
        ));
    }

    let context = build_context(args.source.demo)?;
    let state = analyze_cmd::run(
        &context,
        AnalyzeCommandArgs {
            ticket_id: args.ticket_id,
            policy: args.cycle_policy,
        },
    )
    .await;

    analyze_cmd::report(&state, args.json)
}

fn build_context(demo: bool) -> AppResult<AppContext> {
    let config = AppConfig::load()?;

    let ticket_source: Arc<dyn TicketGraphSource> = if demo {
        Arc::new(DemoSource)
    } else {
        match config.source {
            SourceKind::Dashboard => {
                tracing::debug!(url = %config.dashboard_url, "using dashboard backend");
                Arc::new(DashboardClient::new(config.dashboard_url.clone()))
            }
            SourceKind::Jira => {
                if config.jira.username.is_none() {
                    tracing::warn!("Jira username not configured; analysis will fail.");
                }
                if config.jira.api_token.is_none() {
                    tracing::warn!("Jira API token not configured; analysis will fail.");
                }
                if config.gitlab.token.is_none() {
                    tracing::warn!("GitLab token not configured; analysis will fail.");
                }
                Arc::new(JiraClient::new(config.jira.clone(), config.gitlab.clone()))
            }
        }
    };

    Ok(AppContext::new(config, ticket_source))
}
