//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with the GitHub API
//! through the github_client crate. It provides comprehensive error context for debugging
//! and error handling in applications using this client.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// This enum represents the error conditions when working with the GitHub API,
/// including authentication failures, API errors, rate limiting, and data processing
/// issues. Expected per-resource outcomes (an already-removed member, an unprotected
/// branch) are *not* errors; they are reported through the normal return values of
/// the client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.list_members("my-org").await {
///     Ok(members) => println!("{} members", members.len()),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A GitHub API request failed.
    ///
    /// The contained string carries the status or transport detail reported by
    /// the underlying HTTP layer.
    #[error("GitHub API request failed: {0}")]
    ApiError(String),

    /// Authentication or GitHub client initialization failure.
    ///
    /// This error occurs when:
    /// - The personal access token is invalid or expired
    /// - Network connectivity issues prevent authentication
    /// - The token lacks necessary scopes
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitHub.
    ///
    /// This error occurs when the GitHub API returns a response that cannot be
    /// parsed into the expected data structure.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The requested resource was not found.
    ///
    /// Returned when a read operation targets a resource (organization, team,
    /// repository) that does not exist or is not accessible with the current
    /// authentication.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    ///
    /// The client should back off and retry later. Check the `X-RateLimit-Reset`
    /// header in the response to determine when to retry.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}
