//! Append-only audit trail for reconciliation runs.
//!
//! [`AuditRecorder`] is an owned, per-run resource: each run opens its own
//! JSONL file (single writer, never shared between runs) and appends one
//! record per action plus one run-summary record. Auditing is best-effort
//! relative to the reconciliation outcome: a broken sink is logged, never
//! raised, so it cannot fail an otherwise-successful apply.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::Error;
use crate::plan::{SyncAction, SyncResult};

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;

/// Appends structured records of every action attempt to a per-run log
/// file.
pub struct AuditRecorder {
    log_path: PathBuf,
    run_id: Uuid,
    file: File,
    records: Vec<Value>,
}

impl AuditRecorder {
    /// Opens a fresh audit log under `log_dir`, named
    /// `{prefix}_{timestamp}.jsonl`, and assigns the run id every record
    /// will carry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuditSink`] when the directory or file cannot be
    /// created. This is the only point where the audit trail can fail the
    /// caller; appends later on are best-effort.
    pub fn create(log_dir: impl AsRef<Path>, prefix: &str) -> Result<Self, Error> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("{prefix}_{timestamp}.jsonl"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let run_id = Uuid::new_v4();
        info!(path = %log_path.display(), run_id = %run_id, "Audit log opened");

        Ok(Self {
            log_path,
            run_id,
            file,
            records: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Records a finished run: the summary record first, then one record
    /// per action in execution order.
    pub fn record_result(&mut self, result: &SyncResult) {
        let summary = json!({
            "timestamp": result.executed_at,
            "type": "sync_summary",
            "run_id": self.run_id,
            "org": result.plan.org_name,
            "dry_run": result.dry_run,
            "success": result.success(),
            "success_count": result.success_count,
            "failure_count": result.failure_count,
            "skipped_count": result.skipped_count,
            "total_actions": result.plan.actions.len(),
        });
        self.append(summary);

        for action in result.plan.sorted_actions() {
            self.record_action(action, &result.plan.org_name, result.dry_run);
        }
    }

    /// Records a single action attempt.
    pub fn record_action(&mut self, action: &SyncAction, org_name: &str, dry_run: bool) {
        let record = json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "run_id": self.run_id,
            "org": org_name,
            "dry_run": dry_run,
            "action_type": action.kind.name(),
            "resource": action.resource,
            "details": action.kind.details(),
            "status": action.status,
            "message": action.message,
            "error": action.error,
        });
        self.append(record);
    }

    /// A human-readable summary of what this recorder has written.
    pub fn summary(&self) -> String {
        let count_status = |status: &str| {
            self.records
                .iter()
                .filter(|r| r.get("status").and_then(|s| s.as_str()) == Some(status))
                .count()
        };
        format!(
            "Audit log: {}\n  Records: {}\n  Success: {} | Failed: {} | Skipped: {}",
            self.log_path.display(),
            self.records.len(),
            count_status("success"),
            count_status("failed"),
            count_status("skipped"),
        )
    }

    fn append(&mut self, record: Value) {
        if let Err(e) = writeln!(self.file, "{record}") {
            // Auditing never fails the run it describes.
            error!(path = %self.log_path.display(), error = %e, "Failed to write audit record");
        }
        self.records.push(record);
    }
}
