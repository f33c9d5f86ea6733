//! Desired-state configuration for organization reconciliation.
//!
//! This crate is the "config side" of the reconciliation engine: it reads
//! the YAML files describing how an organization *should* look and turns
//! them into the same [`github_client::OrgState`] model the API client uses
//! for the actual state, so the engine can diff the two directly.
//!
//! Loading is strict about structure (missing files, malformed YAML, and
//! out-of-range enum values fail hard) and collective about content: every
//! duplicate, dangling reference, and questionable setting across all files
//! is gathered into error/warning lists in a single pass, rather than
//! failing on the first finding.

pub mod errors;
pub use errors::{ConfigurationError, ConfigurationResult};

pub mod schema;

pub mod loader;
pub use loader::{load_config, LoadedConfig};

pub mod validator;
pub use validator::validate_all;
