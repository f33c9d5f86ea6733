//! GitHub Actions workflow glue.
//!
//! Helpers for surfacing run outcomes to a surrounding workflow: step
//! outputs (`GITHUB_OUTPUT`), the run's step summary
//! (`GITHUB_STEP_SUMMARY`), and machine-readable result files. All of these
//! are best-effort: a missing or unwritable target is logged and the run
//! carries on.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::error;

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;

/// Sets a GitHub Actions output variable.
///
/// Appends to the `GITHUB_OUTPUT` file when the environment provides one,
/// and falls back to the legacy `::set-output` stdout command otherwise.
pub fn set_output(name: &str, value: &str) {
    match std::env::var("GITHUB_OUTPUT") {
        Ok(path) => {
            if let Err(e) = append_line(Path::new(&path), &format!("{name}={value}")) {
                error!(name = name, error = %e, "Failed to write workflow output");
            }
        }
        Err(_) => println!("::set-output name={name}::{value}"),
    }
}

/// Appends markdown to the workflow step summary, when one is available.
pub fn append_step_summary(content: &str) {
    if let Ok(path) = std::env::var("GITHUB_STEP_SUMMARY") {
        if let Err(e) = append_line(Path::new(&path), content) {
            error!(error = %e, "Failed to append step summary");
        }
    }
}

/// Writes a machine-readable results file.
pub fn write_results_file(path: &Path, value: &serde_json::Value) -> std::io::Result<()> {
    let contents = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, contents)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}
