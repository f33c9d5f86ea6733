//! Configuration system error types.
//!
//! Domain-specific errors for configuration loading and parsing. Content
//! problems that a human must fix in the files themselves (duplicate
//! usernames, dangling references) are not errors at this level; they are
//! collected as validation messages by the loader so that all of them can be
//! reported in one pass.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration system errors.
///
/// These occur when the configuration files cannot be read or parsed at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to access configuration file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Failed to parse configuration: {path} - {reason}")]
    ParseError { path: String, reason: String },
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
