//! `prmerge github` command - merge labelled pull requests from GitHub.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use prmerge_core::PartialConfig;
use prmerge_core::config::GitHubSection;
use prmerge_forge::{Auth, GitHubClient, RepoSlug};
use secrecy::SecretString;

use super::{SharedArgs, driver};

/// Arguments for `prmerge github`.
#[derive(Args)]
pub struct GithubArgs {
    /// Label a pull request must carry to be merged (exact match).
    pub label: String,

    /// Text embedded in commit messages: "Merge <TAGLINE> PR <n>".
    pub tagline: Option<String>,

    /// API token; only needed to lift anonymous rate limits.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository owner [default: yuzu-emu].
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name [default: yuzu].
    #[arg(long)]
    pub repo: Option<String>,

    /// REST API base URL [default: https://api.github.com].
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Base URL for the fetch remote [default: https://github.com].
    #[arg(long, value_name = "URL")]
    pub web_url: Option<String>,
}

impl GithubArgs {
    fn layer(&self) -> PartialConfig {
        PartialConfig {
            label: Some(self.label.clone()),
            tagline: self.tagline.clone(),
            github: GitHubSection {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
                api_url: self.api_url.clone(),
                web_url: self.web_url.clone(),
            },
            ..PartialConfig::default()
        }
    }
}

/// Run the github command.
pub fn run(shared: &SharedArgs, args: GithubArgs) -> Result<()> {
    let config = driver::load_config(shared, args.layer())?;
    let settings = &config.github;

    let auth = Auth::from_token(args.token.map(SecretString::from));
    let client = GitHubClient::new(
        RepoSlug::new(&settings.owner, &settings.repo),
        auth,
        &driver::client_options(&config),
    )
    .context("Failed to create GitHub client")?
    .with_api_url(&settings.api_url)
    .with_web_url(&settings.web_url);

    let root = shared.root.as_deref().unwrap_or_else(|| Path::new("."));
    driver::execute(&client, &config, root, shared.json)
}
