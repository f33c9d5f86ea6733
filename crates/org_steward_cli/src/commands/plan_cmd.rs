//! `plan` subcommand: generate a sync plan without changing anything.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::{error, info, warn};

use github_client::GitHubClient;
use org_steward_core::{Reconciler, SyncPlan};

use crate::commands::read_token;
use crate::errors::Error;
use crate::formatters;
use crate::workflow;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the config directory
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "terminal")]
    pub format: PlanFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Only validate config files; do not query GitHub
    #[arg(long)]
    pub validate_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Terminal,
    Markdown,
    Json,
    Drift,
}

/// Runs the plan command.
///
/// Exit codes: 0 = in sync (or validation passed with `--validate-only`),
/// 1 = validation errors, 2 = drift detected.
pub async fn execute(args: &PlanArgs) -> Result<i32, Error> {
    info!("Loading configuration...");
    let loaded = config_manager::load_config(&args.config_dir)?;

    if !loaded.errors.is_empty() {
        error!("Validation errors found:");
        for err in &loaded.errors {
            error!("  - {err}");
        }

        let org_name = if loaded.state.org_name.is_empty() {
            "unknown".to_string()
        } else {
            loaded.state.org_name.clone()
        };
        let mut plan = SyncPlan::new(org_name);
        plan.validation_errors = loaded.errors;
        plan.warnings = loaded.warnings;
        emit(&plan, args)?;
        return Ok(1);
    }

    for warning in &loaded.warnings {
        warn!("  - {warning}");
    }

    if args.validate_only {
        info!("Config validation passed.");
        if !loaded.warnings.is_empty() {
            info!("  {} warning(s)", loaded.warnings.len());
        }
        return Ok(0);
    }

    let token = read_token()?;
    let client = GitHubClient::new(github_client::create_token_client(&token)?);
    let reconciler = Reconciler::new(&client, loaded.state.org_name.clone());

    info!("Fetching current state from GitHub...");
    let actual = reconciler.fetch_current_state().await?;

    info!("Generating plan...");
    let mut plan = reconciler.diff(&loaded.state, &actual);
    plan.warnings.extend(loaded.warnings);

    emit(&plan, args)?;

    if plan.has_changes() {
        Ok(2)
    } else {
        Ok(0)
    }
}

fn render(plan: &SyncPlan, format: PlanFormat) -> String {
    match format {
        PlanFormat::Terminal => formatters::format_plan_terminal(plan),
        PlanFormat::Markdown => formatters::format_plan_markdown(plan),
        PlanFormat::Json => formatters::format_plan_json(plan),
        PlanFormat::Drift => formatters::format_drift_report(plan),
    }
}

fn emit(plan: &SyncPlan, args: &PlanArgs) -> Result<(), Error> {
    let output = render(plan, args.format);
    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            info!(path = %path.display(), "Plan written");
        }
        None => println!("{output}"),
    }

    workflow::append_step_summary(&formatters::format_plan_markdown(plan));
    Ok(())
}
