//! Error types for the merge pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a merge run.
#[derive(Debug, Error)]
pub enum Error {
    /// Hosting API transport or decoding failure.
    #[error(transparent)]
    Forge(#[from] prmerge_forge::Error),

    /// A hosting API answered with a non-success status.
    #[error("{what} returned HTTP {status}: {message}")]
    HttpStatus {
        /// Which request failed.
        what: String,
        /// HTTP status code.
        status: u16,
        /// Response body or explanation.
        message: String,
    },

    /// A fetch, squash-merge or commit for one pull request failed.
    #[error("failed to merge PR #{number}")]
    MergeFailed {
        /// Pull request number.
        number: u64,
        /// Underlying git error.
        #[source]
        source: prmerge_git::Error,
    },

    /// A ref reported by the API is not safe to hand to git.
    #[error("invalid ref name '{name}': {reason}")]
    InvalidRefName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::PartialConfig`].
    #[error("invalid config file {}: {source}", path.display())]
    ConfigParse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// Resolved configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
