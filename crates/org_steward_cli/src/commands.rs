//! CLI subcommand implementations.

pub mod apply_cmd;
pub mod plan_cmd;
pub mod scan_cmd;

use secrecy::SecretString;

use crate::errors::Error;

/// Reads the GitHub token from the `GITHUB_TOKEN` environment variable.
pub(crate) fn read_token() -> Result<SecretString, Error> {
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => Ok(SecretString::from(token)),
        _ => Err(Error::MissingToken),
    }
}
