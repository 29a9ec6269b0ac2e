//! # prmerge-forge
//!
//! Hosting API clients for prmerge. Both backends sit behind the
//! [`Backend`] trait so discovery, filtering and merging can be shared.

mod auth;
mod azure;
mod backend;
mod error;
mod github;
mod http;
mod types;

pub use auth::{Auth, Credential, redact_url};
pub use azure::AzureClient;
pub use backend::Backend;
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use types::{ClientOptions, FetchSource, Fetched, Pagination, PullRequest, RepoSlug};
