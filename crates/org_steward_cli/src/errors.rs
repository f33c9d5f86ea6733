//! CLI error type.
//!
//! Wraps the collaborator errors so command handlers can use `?` freely;
//! `main` renders whatever bubbles up and exits non-zero.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Debug, Error)]
pub enum Error {
    #[error("GITHUB_TOKEN environment variable not set")]
    MissingToken,

    #[error(transparent)]
    Config(#[from] config_manager::ConfigurationError),

    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    #[error(transparent)]
    Engine(#[from] org_steward_core::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
