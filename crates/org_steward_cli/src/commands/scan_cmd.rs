//! `scan` subcommand: security posture findings over the live organization.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::info;

use github_client::GitHubClient;
use org_steward_core::Reconciler;

use crate::commands::read_token;
use crate::errors::Error;
use crate::formatters;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the config directory (supplies the organization name)
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Organization to scan, overriding the configured one
    #[arg(long)]
    pub org: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "terminal")]
    pub format: ScanFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScanFormat {
    Terminal,
    Json,
}

/// Runs the scan command. Findings are advisory, so the exit code is 0
/// whenever the scan itself completes.
pub async fn execute(args: &ScanArgs) -> Result<i32, Error> {
    let org_name = match &args.org {
        Some(org) => org.clone(),
        None => {
            let loaded = config_manager::load_config(&args.config_dir)?;
            loaded.state.org_name
        }
    };

    let token = read_token()?;
    let client = GitHubClient::new(github_client::create_token_client(&token)?);
    let reconciler = Reconciler::new(&client, org_name.clone());

    info!(org = %org_name, "Fetching current state from GitHub...");
    let actual = reconciler.fetch_current_state().await?;

    let findings = reconciler.security_audit(&actual);
    info!(count = findings.len(), "Posture scan complete");

    let output = match args.format {
        ScanFormat::Terminal => formatters::format_findings_terminal(&findings),
        ScanFormat::Json => formatters::format_findings_json(&findings),
    };
    println!("{output}");

    Ok(0)
}
