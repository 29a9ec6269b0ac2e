//! # prmerge-git
//!
//! Working tree operations for prmerge. Repository inspection goes through
//! git2; fetch, merge and commit shell out to `git` so they behave exactly
//! like the command line (credentials in remote URLs, hooks, config).

mod error;
mod repository;

pub use error::{Error, Result};
pub use repository::{FetchOptions, Identity, Repository};
