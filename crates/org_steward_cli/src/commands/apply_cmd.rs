//! `apply` subcommand: reconcile the organization with the config files.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{error, info, warn};

use github_client::GitHubClient;
use org_steward_core::{AuditRecorder, Reconciler};

use crate::commands::read_token;
use crate::errors::Error;
use crate::formatters;
use crate::workflow;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the config directory
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Run in dry-run mode (no actual changes)
    #[arg(long)]
    pub dry_run: bool,

    /// Directory the audit log is written to
    #[arg(long, default_value = ".")]
    pub audit_dir: PathBuf,
}

/// Runs the apply command.
///
/// Exit codes: 0 = applied with zero failures (or nothing to do),
/// 1 = validation errors or at least one action failed.
pub async fn execute(args: &ApplyArgs) -> Result<i32, Error> {
    info!("Loading configuration...");
    let loaded = config_manager::load_config(&args.config_dir)?;

    if !loaded.errors.is_empty() {
        error!("Validation errors - aborting:");
        for err in &loaded.errors {
            error!("  - {err}");
        }
        return Ok(1);
    }

    for warning in &loaded.warnings {
        warn!("  - {warning}");
    }

    let token = read_token()?;
    let client = GitHubClient::new(github_client::create_token_client(&token)?);
    let reconciler = Reconciler::new(&client, loaded.state.org_name.clone());

    info!("Fetching current state from GitHub...");
    let actual = reconciler.fetch_current_state().await?;

    info!("Generating sync plan...");
    let mut plan = reconciler.diff(&loaded.state, &actual);
    plan.warnings.extend(loaded.warnings);

    println!("{}", formatters::format_plan_terminal(&plan));

    if !plan.has_changes() {
        info!("Organization is already in sync - nothing to do.");
        workflow::set_output("sync_status", "no_changes");
        return Ok(0);
    }

    let dry_run = args.dry_run
        || std::env::var("DRY_RUN")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);
    let mode = if dry_run { "DRY RUN" } else { "LIVE" };
    info!(mode = mode, "Executing plan...");

    let result = reconciler.apply(plan, dry_run).await;

    // Auditing is best-effort: a broken sink never fails the run.
    match AuditRecorder::create(&args.audit_dir, "sync_audit") {
        Ok(mut audit) => {
            audit.record_result(&result);
            info!("{}", audit.summary());
        }
        Err(e) => error!(error = %e, "Audit log unavailable"),
    }

    if let Err(e) = workflow::write_results_file(Path::new("sync_results.json"), &result.to_value())
    {
        error!(error = %e, "Failed to write sync_results.json");
    }

    println!("{}", formatters::format_result_terminal(&result));

    workflow::set_output(
        "sync_status",
        if result.success() { "success" } else { "failed" },
    );
    workflow::set_output("success_count", &result.success_count.to_string());
    workflow::set_output("failure_count", &result.failure_count.to_string());
    workflow::append_step_summary(&formatters::format_step_summary(&result));

    if result.success() {
        info!("Sync completed successfully.");
        Ok(0)
    } else {
        error!("Sync completed with {} failure(s).", result.failure_count);
        Ok(1)
    }
}
