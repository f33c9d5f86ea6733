//! Error types for the reconciliation engine.
//!
//! The engine surfaces very few errors of its own: diffing is pure and
//! cannot fail on valid states, and per-action execution failures are
//! captured inside the plan rather than raised. What remains is the
//! inability to build an actual-state snapshot and the inability to open
//! the audit sink.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug)]
pub enum Error {
    /// The actual-state query against the control plane failed.
    #[error("Failed to query organization state: {0}")]
    StateFetch(#[from] github_client::Error),

    /// The audit log file could not be created or opened.
    #[error("Failed to open audit log: {0}")]
    AuditSink(#[from] std::io::Error),
}
