//! Shared driver for the backend subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use prmerge_core::{
    Config, GitMerger, MergeRecord, MergeRequest, MergeStep, PartialConfig, Progress,
};
use prmerge_forge::{Backend, ClientOptions};
use prmerge_git::Repository;

use super::SharedArgs;
use crate::output;

/// Resolve the configuration: defaults < `--config` file < env/flags.
pub fn load_config(shared: &SharedArgs, command: PartialConfig) -> Result<Config> {
    let file = match &shared.config {
        Some(path) => PartialConfig::load(path)?,
        None => PartialConfig::default(),
    };

    let config = file.overlay(shared.layer()).overlay(command).resolve()?;
    Ok(config)
}

/// HTTP client settings derived from the configuration.
pub const fn client_options(config: &Config) -> ClientOptions {
    ClientOptions {
        timeout: config.timeout,
    }
}

/// Run the merge pipeline against `backend` in the working tree at `root`.
pub fn execute(backend: &dyn Backend, config: &Config, root: &Path, json: bool) -> Result<()> {
    let repo = Repository::open(root)
        .with_context(|| format!("Not inside a git repository: {}", root.display()))?;
    repo.require_idle()?;
    let branch = repo.current_branch()?;

    if config.dry_run {
        output::info(&format!("Dry run - nothing will be merged into '{branch}'"));
    } else {
        output::info(&format!(
            "Merging {} pull requests labelled '{}' into '{branch}'",
            backend.name(),
            config.label
        ));
    }

    let merger = GitMerger::new(&repo, config.identity.clone());
    let progress = ConsoleProgress {
        dry_run: config.dry_run,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let report = runtime.block_on(prmerge_core::run(backend, &merger, config, &progress))?;

    if json {
        output::essential(&serde_json::to_string_pretty(&report)?);
    } else {
        output::report(&report);
    }

    Ok(())
}

/// Prints pipeline progress through [`output`].
struct ConsoleProgress {
    dry_run: bool,
}

impl Progress for ConsoleProgress {
    fn on_page(&self, page: Option<u32>, count: usize) {
        match page {
            Some(page) if count > 0 => {
                output::info(&format!("Page {page}: {count} open pull request(s)"));
            }
            Some(page) => output::info(&format!("Page {page} is empty, done listing")),
            None => output::info(&format!("Found {count} open pull request(s)")),
        }
    }

    fn on_skipped(&self, what: &str, status: u16, message: &str) {
        output::warn(&format!("{what} returned HTTP {status}, skipping: {message}"));
    }

    fn on_match(&self, request: &MergeRequest) {
        let verb = if self.dry_run { "Would merge" } else { "Merging" };
        output::info(&format!(
            "{verb} {} {}",
            output::pr_ref(request.number),
            request.title
        ));
    }

    fn on_step(&self, request: &MergeRequest, step: MergeStep) {
        let msg = match step {
            MergeStep::Fetch => format!(
                "  Fetching {} from {}",
                request.source_ref, request.source.display_remote
            ),
            MergeStep::SquashMerge => format!("  Squash-merging {}", request.local_ref),
            MergeStep::Commit => format!("  Committing \"{}\"", request.message),
        };
        output::info(&msg);
    }

    fn on_output(&self, text: &str) {
        output::command_output(text);
    }

    fn on_merged(&self, record: &MergeRecord) {
        if self.dry_run {
            output::success(&format!(
                "{} would be committed as \"{}\"",
                output::pr_ref(record.number),
                record.message
            ));
        } else {
            output::success(&format!("Merged {}", output::pr_ref(record.number)));
        }
    }
}
