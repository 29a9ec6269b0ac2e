//! Fetch, squash-merge and commit one pull request.
//!
//! Git access goes through the [`Merger`] trait so the pipeline can be
//! driven against a recording fake in tests; [`GitMerger`] is the real
//! implementation on top of [`prmerge_git::Repository`].

use prmerge_forge::{Backend, FetchSource, PullRequest};
use prmerge_git::{FetchOptions, Identity, Repository};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::pipeline::Progress;
use crate::ref_name::RefName;

/// The three git operations a merge is made of.
pub trait Merger {
    /// `git fetch -f <remote> <refspec>`.
    ///
    /// # Errors
    /// Returns error if git fails.
    fn fetch(&self, source: &FetchSource, refspec: &str) -> prmerge_git::Result<String>;

    /// `git merge --squash <local_ref>`.
    ///
    /// # Errors
    /// Returns error if git fails or the merge conflicts.
    fn squash_merge(&self, local_ref: &str) -> prmerge_git::Result<String>;

    /// `git commit -m <message>`.
    ///
    /// # Errors
    /// Returns error if git fails or nothing is staged.
    fn commit(&self, message: &str) -> prmerge_git::Result<String>;

    /// Abbreviated id of the commit `local_ref` points at.
    ///
    /// # Errors
    /// Returns error if the ref cannot be resolved.
    fn short_rev(&self, local_ref: &str) -> prmerge_git::Result<String>;
}

/// [`Merger`] backed by the `git` executable in a working tree.
#[derive(Debug)]
pub struct GitMerger<'a> {
    repo: &'a Repository,
    identity: Option<Identity>,
}

impl<'a> GitMerger<'a> {
    /// Merge into `repo`, committing as `identity` when set.
    #[must_use]
    pub const fn new(repo: &'a Repository, identity: Option<Identity>) -> Self {
        Self { repo, identity }
    }
}

impl Merger for GitMerger<'_> {
    fn fetch(&self, source: &FetchSource, refspec: &str) -> prmerge_git::Result<String> {
        let options = FetchOptions {
            force: true,
            recurse_submodules: source.recurse_submodules,
        };
        self.repo
            .fetch(&source.remote, &source.display_remote, refspec, options)
    }

    fn squash_merge(&self, local_ref: &str) -> prmerge_git::Result<String> {
        self.repo.merge_squash(local_ref)
    }

    fn commit(&self, message: &str) -> prmerge_git::Result<String> {
        self.repo.commit(message, self.identity.as_ref())
    }

    fn short_rev(&self, local_ref: &str) -> prmerge_git::Result<String> {
        self.repo.short_rev(local_ref)
    }
}

/// Step of a merge, reported through [`Progress::on_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// Fetching the pull request head into its local branch.
    Fetch,
    /// Squash-merging the local branch into the current one.
    SquashMerge,
    /// Committing the squashed changes.
    Commit,
}

impl MergeStep {
    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::SquashMerge => "merge",
            Self::Commit => "commit",
        }
    }
}

/// Everything needed to merge one pull request.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Where to fetch from.
    pub source: FetchSource,
    /// Validated ref on the remote.
    pub source_ref: RefName,
    /// Local branch the head is fetched into.
    pub local_ref: RefName,
    /// Commit message for the squash commit.
    pub message: String,
}

impl MergeRequest {
    /// Build the request for `pr` on `backend`.
    ///
    /// # Errors
    /// Returns `InvalidRefName` if the backend reports an unsafe source ref.
    pub fn plan(backend: &dyn Backend, pr: &PullRequest, tagline: &str) -> Result<Self> {
        let source = backend.fetch_source(pr)?;
        let source_ref = RefName::new(source.source_ref.clone())?;

        Ok(Self {
            number: pr.number,
            title: pr.title.clone(),
            source_ref,
            local_ref: RefName::for_pull_request(pr.number),
            message: backend.commit_message(tagline, pr),
            source,
        })
    }

    /// `<source>:refs/heads/pr-<n>`.
    #[must_use]
    pub fn refspec(&self) -> String {
        format!("{}:refs/heads/{}", self.source_ref, self.local_ref)
    }
}

/// Outcome of one successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRecord {
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Commit message used.
    pub message: String,
    /// Short id of the merged head; `None` in dry-run mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Run fetch, squash-merge and commit for `request`, in that order.
///
/// Stops at the first failing step.
///
/// # Errors
/// Returns `MergeFailed` carrying the failing git error.
pub fn execute(
    merger: &dyn Merger,
    request: &MergeRequest,
    progress: &dyn Progress,
) -> Result<MergeRecord> {
    let failed = |source| Error::MergeFailed {
        number: request.number,
        source,
    };

    progress.on_step(request, MergeStep::Fetch);
    let output = merger
        .fetch(&request.source, &request.refspec())
        .map_err(failed)?;
    progress.on_output(&output);

    progress.on_step(request, MergeStep::SquashMerge);
    let output = merger.squash_merge(&request.local_ref).map_err(failed)?;
    progress.on_output(&output);

    progress.on_step(request, MergeStep::Commit);
    let output = merger.commit(&request.message).map_err(failed)?;
    progress.on_output(&output);

    // Informational; the merge itself already succeeded
    let revision = merger.short_rev(&request.local_ref).ok();

    Ok(MergeRecord {
        number: request.number,
        title: request.title.clone(),
        message: request.message.clone(),
        revision,
    })
}
