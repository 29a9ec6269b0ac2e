//! The backend trait shared by GitHub and Azure DevOps.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{FetchSource, Fetched, Pagination, PullRequest};

/// A hosting backend that can list pull requests and describe where to
/// fetch them from.
///
/// Implementations only talk HTTP; they never touch the working tree.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in output.
    fn name(&self) -> &'static str;

    /// How [`Backend::list_pull_requests`] is split into requests.
    fn pagination(&self) -> Pagination;

    /// List open pull requests.
    ///
    /// `page` is `Some` (starting at 1) for [`Pagination::Paged`] backends
    /// and `None` otherwise. An empty listing is [`Fetched::Empty`].
    async fn list_pull_requests(&self, page: Option<u32>) -> Result<Fetched<Vec<PullRequest>>>;

    /// Labels attached to a pull request.
    ///
    /// The default returns the labels embedded in the listing.
    async fn fetch_labels(&self, pr: &PullRequest) -> Result<Fetched<Vec<String>>> {
        Ok(Fetched::Data(pr.labels.clone().unwrap_or_default()))
    }

    /// Remote and ref to fetch the pull request head from.
    ///
    /// # Errors
    /// Returns error if the remote URL cannot be built.
    fn fetch_source(&self, pr: &PullRequest) -> Result<FetchSource>;

    /// Commit message for the squash-merge of `pr`.
    fn commit_message(&self, tagline: &str, pr: &PullRequest) -> String;
}

/// Join message words, dropping empty ones so a blank tagline leaves no gap.
pub(crate) fn compose_message(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
