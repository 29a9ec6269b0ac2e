//! Hosting API types.

use std::fmt;
use std::time::Duration;

/// A pull request as discovered on a hosting backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number (GitHub) or pull request id (Azure DevOps).
    pub number: u64,

    /// PR title.
    pub title: String,

    /// Source ref as reported by the backend.
    pub source_ref: String,

    /// Repository id, only reported by Azure DevOps.
    pub repository_id: Option<String>,

    /// Label names when the listing embeds them, `None` when they need a
    /// separate request.
    pub labels: Option<Vec<String>>,
}

/// Outcome of a single API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The request succeeded and returned data.
    Data(T),

    /// The request succeeded with nothing in it.
    Empty,

    /// The server answered with a non-success status.
    Failed {
        /// HTTP status code.
        status: u16,
        /// Response body or a short explanation.
        message: String,
    },
}

impl<T> Fetched<T> {
    /// Map the data variant, leaving the others untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Data(data) => Fetched::Data(f(data)),
            Self::Empty => Fetched::Empty,
            Self::Failed { status, message } => Fetched::Failed { status, message },
        }
    }
}

impl<T> Fetched<Vec<T>> {
    /// Collapse an empty collection into [`Fetched::Empty`].
    #[must_use]
    pub fn non_empty(self) -> Self {
        match self {
            Self::Data(items) if items.is_empty() => Self::Empty,
            other => other,
        }
    }
}

/// How a backend's pull request listing is split up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Numbered pages starting at 1.
    Paged,
    /// Everything comes back from one request.
    Single,
}

/// Where to fetch a pull request's changes from.
#[derive(Clone)]
pub struct FetchSource {
    /// Remote URL handed to `git fetch`. May carry credentials.
    pub remote: String,

    /// Remote URL safe for printing.
    pub display_remote: String,

    /// Ref on the remote holding the pull request head.
    pub source_ref: String,

    /// Whether `git fetch` should recurse into submodules.
    pub recurse_submodules: bool,
}

impl fmt::Debug for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSource")
            .field("remote", &self.display_remote)
            .field("source_ref", &self.source_ref)
            .field("recurse_submodules", &self.recurse_submodules)
            .finish()
    }
}

/// An `owner/name` (or `organization/name`) repository pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Owner or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoSlug {
    /// Create a new slug.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Settings shared by every HTTP client.
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    /// Upper bound for a whole request, connect to last body byte.
    pub timeout: Duration,
}

impl ClientOptions {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
