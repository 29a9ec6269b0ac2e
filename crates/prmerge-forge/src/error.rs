//! Error types for hosting API operations.

use thiserror::Error;

/// Result type alias for forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a hosting API.
///
/// Non-success HTTP statuses are not errors here; they surface as
/// [`crate::Fetched::Failed`] so callers can pick a policy.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// Request URL (credentials redacted).
        url: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A configured base URL could not be parsed or extended.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The credential prefix could not be applied.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}
