use clap::{Parser, Subcommand};

mod commands;
mod errors;
mod formatters;
mod workflow;

use errors::Error;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::apply_cmd::ApplyArgs;
use crate::commands::plan_cmd::PlanArgs;
use crate::commands::scan_cmd::ScanArgs;

/// OrgSteward CLI: reconcile a GitHub organization with declarative config
#[derive(Parser)]
#[command(name = "org-steward")]
#[command(about = "Reconcile a GitHub organization with declarative config", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sync plan without changing anything
    Plan(PlanArgs),

    /// Apply the sync plan to the organization
    Apply(ApplyArgs),

    /// Scan the live organization for security posture findings
    Scan(ScanArgs),

    /// Show the CLI version
    Version,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("ORG_STEWARD_LOG"))
        .init();

    let cli = Cli::parse();
    let outcome: Result<i32, Error> = match &cli.command {
        Commands::Plan(args) => commands::plan_cmd::execute(args).await,
        Commands::Apply(args) => commands::apply_cmd::execute(args).await,
        Commands::Scan(args) => commands::scan_cmd::execute(args).await,
        Commands::Version => {
            println!("org-steward version {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Error: {e}");
            std::process::exit(1);
        }
    }
}
