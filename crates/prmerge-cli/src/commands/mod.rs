//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use prmerge_core::{PartialConfig, StatusPolicy};

pub mod azure;
pub mod github;
mod driver;

/// prmerge - squash-merge labelled pull requests into the current checkout.
///
/// Lists the open pull requests of a GitHub or Azure DevOps repository,
/// keeps those carrying LABEL, and for each one runs `git fetch`,
/// `git merge --squash` and `git commit` in the working tree, in order.
/// The first failure stops the run.
#[derive(Parser)]
#[command(name = "prmerge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub shared: SharedArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Progress output is suppressed for `--quiet` and kept off stdout for `--json`.
    #[must_use]
    pub const fn quiet_requested(&self) -> bool {
        self.shared.quiet || self.shared.json
    }
}

/// Options accepted by every subcommand.
#[derive(Args)]
pub struct SharedArgs {
    /// Working tree to merge into (defaults to the current directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// TOML file with defaults for any option below.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Highest listing page to request (paged backends only, default 29).
    #[arg(long, global = true, value_name = "N")]
    pub max_pages: Option<u32>,

    /// HTTP request timeout in seconds (default 30).
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// What to do when the hosting API answers with an error status.
    #[arg(long, global = true, value_enum, value_name = "POLICY")]
    pub on_http_error: Option<HttpErrorPolicy>,

    /// Show what would be merged without touching the working tree.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the merge report as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress informational output.
    ///
    /// Only errors and the final report are printed.
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,
}

impl SharedArgs {
    /// Configuration layer made of the options given on the command line.
    fn layer(&self) -> PartialConfig {
        PartialConfig {
            max_pages: self.max_pages,
            timeout_secs: self.timeout,
            on_http_error: self.on_http_error.map(StatusPolicy::from),
            dry_run: self.dry_run.then_some(true),
            ..PartialConfig::default()
        }
    }
}

/// `--on-http-error` values.
#[derive(Clone, Copy, ValueEnum)]
pub enum HttpErrorPolicy {
    /// Abort the run.
    Fail,
    /// Treat the response as empty and carry on.
    Skip,
}

impl From<HttpErrorPolicy> for StatusPolicy {
    fn from(policy: HttpErrorPolicy) -> Self {
        match policy {
            HttpErrorPolicy::Fail => Self::Fail,
            HttpErrorPolicy::Skip => Self::Skip,
        }
    }
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Merge labelled pull requests from a GitHub repository.
    #[command(alias = "gh")]
    Github(github::GithubArgs),

    /// Merge labelled pull requests from an Azure DevOps repository.
    #[command(alias = "az")]
    Azure(azure::AzureArgs),
}
