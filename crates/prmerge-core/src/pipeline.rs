//! Discover → filter → merge.
//!
//! [`run`] drives a [`Backend`] page by page, keeps the pull requests
//! carrying the target label and merges each one before asking for the
//! next page. Everything is sequential and the first error ends the run;
//! merges already committed stay in place.

use std::collections::HashSet;

use prmerge_forge::{Backend, Pagination, PullRequest};
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::executor::{self, MergeRecord, MergeRequest, MergeStep, Merger};
use crate::label::has_label;
use crate::pagination::PageCursor;
use crate::policy::Settled;

/// Hooks for reporting progress while a run is underway.
///
/// Every method defaults to doing nothing.
pub trait Progress {
    /// A listing request came back; `page` is `None` for unpaged backends.
    fn on_page(&self, _page: Option<u32>, _count: usize) {}

    /// A failed request was skipped under [`crate::StatusPolicy::Skip`].
    fn on_skipped(&self, _what: &str, _status: u16, _message: &str) {}

    /// A pull request carries the target label and is about to be merged.
    fn on_match(&self, _request: &MergeRequest) {}

    /// A merge step is starting.
    fn on_step(&self, _request: &MergeRequest, _step: MergeStep) {}

    /// Captured stdout of a git command.
    fn on_output(&self, _output: &str) {}

    /// A pull request was merged (or would have been, in dry-run mode).
    fn on_merged(&self, _record: &MergeRecord) {}
}

/// [`Progress`] that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Progress for Silent {}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Backend name.
    pub backend: String,
    /// Target label.
    pub label: String,
    /// Whether git was left untouched.
    pub dry_run: bool,
    /// Listing requests issued.
    pub pages: u32,
    /// Distinct pull requests examined.
    pub scanned: usize,
    /// Merged pull requests, in merge order.
    pub merges: Vec<MergeRecord>,
}

impl MergeReport {
    fn new(backend: &dyn Backend, config: &Config) -> Self {
        Self {
            backend: backend.name().to_string(),
            label: config.label.clone(),
            dry_run: config.dry_run,
            pages: 0,
            scanned: 0,
            merges: Vec::new(),
        }
    }
}

/// Merge every open pull request on `backend` labelled `config.label`.
///
/// # Errors
/// Returns the first transport, HTTP status (under
/// [`crate::StatusPolicy::Fail`]), ref validation or git error.
pub async fn run(
    backend: &dyn Backend,
    merger: &dyn Merger,
    config: &Config,
    progress: &dyn Progress,
) -> Result<MergeReport> {
    let mut run = Run {
        backend,
        merger,
        config,
        progress,
        seen: HashSet::new(),
        report: MergeReport::new(backend, config),
    };

    match backend.pagination() {
        Pagination::Paged => {
            let mut cursor = PageCursor::new(config.max_pages);
            while let Some(page) = cursor.next_page() {
                let what = format!("{} pull request page {page}", backend.name());
                if !run.listing(Some(page), &what).await? {
                    cursor.finish();
                }
            }
        }
        Pagination::Single => {
            let what = format!("{} pull request listing", backend.name());
            run.listing(None, &what).await?;
        }
    }

    Ok(run.report)
}

struct Run<'a> {
    backend: &'a dyn Backend,
    merger: &'a dyn Merger,
    config: &'a Config,
    progress: &'a dyn Progress,
    seen: HashSet<u64>,
    report: MergeReport,
}

impl Run<'_> {
    /// Request one listing and merge its matches.
    ///
    /// Returns `false` when the listing came back empty.
    async fn listing(&mut self, page: Option<u32>, what: &str) -> Result<bool> {
        let fetched = self.backend.list_pull_requests(page).await?;
        self.report.pages += 1;

        match self.config.on_http_error.settle(fetched, what)? {
            Settled::Data(prs) => {
                self.progress.on_page(page, prs.len());
                for pr in prs {
                    self.consider(pr).await?;
                }
                Ok(true)
            }
            Settled::Empty => {
                self.progress.on_page(page, 0);
                Ok(false)
            }
            Settled::Skipped { status, message } => {
                self.progress.on_skipped(what, status, &message);
                Ok(true)
            }
        }
    }

    async fn consider(&mut self, pr: PullRequest) -> Result<()> {
        if !self.seen.insert(pr.number) {
            return Ok(());
        }
        self.report.scanned += 1;

        let what = format!("labels of pull request #{}", pr.number);
        let fetched = self.backend.fetch_labels(&pr).await?;
        let labels = match self.config.on_http_error.settle(fetched, &what)? {
            Settled::Data(labels) => labels,
            Settled::Empty => Vec::new(),
            Settled::Skipped { status, message } => {
                self.progress.on_skipped(&what, status, &message);
                Vec::new()
            }
        };

        if !has_label(&labels, &self.config.label) {
            return Ok(());
        }

        let request = MergeRequest::plan(self.backend, &pr, &self.config.tagline)?;
        self.progress.on_match(&request);

        let record = if self.config.dry_run {
            MergeRecord {
                number: request.number,
                title: request.title.clone(),
                message: request.message.clone(),
                revision: None,
            }
        } else {
            executor::execute(self.merger, &request, self.progress)?
        };

        self.progress.on_merged(&record);
        self.report.merges.push(record);
        Ok(())
    }
}
