//! `prmerge azure` command - merge labelled pull requests from Azure DevOps.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use prmerge_core::PartialConfig;
use prmerge_core::config::AzureSection;
use prmerge_forge::{AzureClient, Credential, RepoSlug};

use super::{SharedArgs, driver};

/// Arguments for `prmerge azure`.
#[derive(Args)]
pub struct AzureArgs {
    /// Credential prefix for the service, as in `user:token@`.
    #[arg(value_name = "CREDENTIAL")]
    pub credential: String,

    /// Label a pull request must carry to be merged (exact match).
    pub label: String,

    /// Working tree to merge into; overrides --root.
    #[arg(value_name = "ROOT")]
    pub workdir: Option<PathBuf>,

    /// Azure DevOps organization [default: yuzu-emu].
    #[arg(long = "org", env = "PRIVATEMERGEORG", value_name = "ORG")]
    pub organization: Option<String>,

    /// Repository name [default: yuzu-private].
    #[arg(long, env = "PRIVATEMERGEREPO")]
    pub repo: Option<String>,

    /// Text embedded in commit messages: "Private Merge <TAGLINE> - <n>".
    #[arg(long, env = "MERGETAGLINEPRIVATE")]
    pub tagline: Option<String>,

    /// Service base URL [default: https://dev.azure.com].
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Base URL for the git remote [default: the service base URL].
    #[arg(long, value_name = "URL")]
    pub git_url: Option<String>,
}

impl AzureArgs {
    fn layer(&self) -> PartialConfig {
        PartialConfig {
            label: Some(self.label.clone()),
            tagline: self.tagline.clone(),
            azure: AzureSection {
                organization: self.organization.clone(),
                repo: self.repo.clone(),
                api_url: self.api_url.clone(),
                git_url: self.git_url.clone(),
            },
            ..PartialConfig::default()
        }
    }
}

/// Run the azure command.
pub fn run(shared: &SharedArgs, args: AzureArgs) -> Result<()> {
    let config = driver::load_config(shared, args.layer())?;
    let settings = &config.azure;

    let mut client = AzureClient::new(
        RepoSlug::new(&settings.organization, &settings.repo),
        Credential::parse(&args.credential),
        &driver::client_options(&config),
    )
    .context("Failed to create Azure DevOps client")?
    .with_api_url(&settings.api_url);
    if let Some(git_url) = &settings.git_url {
        client = client.with_git_url(git_url);
    }

    let root = args
        .workdir
        .as_deref()
        .or(shared.root.as_deref())
        .unwrap_or_else(|| Path::new("."));
    driver::execute(&client, &config, root, shared.json)
}
