//! Error types for git operations.

use thiserror::Error;

/// Result type alias for git operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Repository has no working tree.
    #[error("cannot operate on a bare repository")]
    BareRepository,

    /// HEAD does not point at a branch.
    #[error("HEAD is detached - check out the branch to merge into")]
    DetachedHead,

    /// A merge, rebase or similar is already in progress.
    #[error("repository is in the middle of an operation ({0}) - finish or abort it first")]
    OperationInProgress(String),

    /// Reference could not be resolved.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// `git` could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    /// `git` exited with a non-zero status.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        /// Command line, credentials redacted.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
