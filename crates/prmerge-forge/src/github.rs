//! GitHub API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::auth::Auth;
use crate::backend::{Backend, compose_message};
use crate::error::Result;
use crate::http;
use crate::types::{ClientOptions, FetchSource, Fetched, Pagination, PullRequest, RepoSlug};

/// GitHub API client for one repository.
pub struct GitHubClient {
    client: Client,
    api_url: String,
    web_url: String,
    repo: RepoSlug,
    auth: Auth,
}

impl GitHubClient {
    /// Default GitHub API URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Default base for clone URLs.
    pub const DEFAULT_WEB_URL: &'static str = "https://github.com";

    /// Create a new GitHub client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(repo: RepoSlug, auth: Auth, options: &ClientOptions) -> Result<Self> {
        let client = http::build_client("application/vnd.github+json", options)?;

        Ok(Self {
            client,
            api_url: Self::DEFAULT_API_URL.to_string(),
            web_url: Self::DEFAULT_WEB_URL.to_string(),
            repo,
            auth,
        })
    }

    /// Use a custom API URL (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a custom base for clone URLs.
    #[must_use]
    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = web_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get one page of open pull requests.
    ///
    /// # Errors
    /// Returns error on transport failure or a malformed body.
    pub async fn list_page(&self, page: u32) -> Result<Fetched<Vec<PullRequest>>> {
        #[derive(Deserialize)]
        struct ApiPr {
            number: u64,
            title: String,
            head: Branch,
            #[serde(default)]
            labels: Vec<ApiLabel>,
        }

        #[derive(Deserialize)]
        struct Branch {
            #[serde(rename = "ref")]
            ref_name: String,
        }

        #[derive(Deserialize)]
        struct ApiLabel {
            name: String,
        }

        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.api_url, self.repo.owner, self.repo.name
        );
        let response = self
            .auth
            .apply(self.client.get(&url))
            .query(&[("page", page)])
            .send()
            .await?;

        let prs: Fetched<Vec<ApiPr>> = http::decode(&url, response).await?;

        Ok(prs
            .map(|prs| {
                prs.into_iter()
                    .map(|api_pr| PullRequest {
                        number: api_pr.number,
                        title: api_pr.title,
                        source_ref: api_pr.head.ref_name,
                        repository_id: None,
                        labels: Some(api_pr.labels.into_iter().map(|l| l.name).collect()),
                    })
                    .collect()
            })
            .non_empty())
    }
}

#[async_trait]
impl Backend for GitHubClient {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    fn pagination(&self) -> Pagination {
        Pagination::Paged
    }

    async fn list_pull_requests(&self, page: Option<u32>) -> Result<Fetched<Vec<PullRequest>>> {
        self.list_page(page.unwrap_or(1)).await
    }

    fn fetch_source(&self, pr: &PullRequest) -> Result<FetchSource> {
        // The base repository exposes every PR head, forks included
        let remote = format!("{}/{}/{}.git", self.web_url, self.repo.owner, self.repo.name);

        Ok(FetchSource {
            display_remote: remote.clone(),
            remote,
            source_ref: format!("pull/{}/head", pr.number),
            recurse_submodules: false,
        })
    }

    fn commit_message(&self, tagline: &str, pr: &PullRequest) -> String {
        compose_message(&["Merge", tagline, "PR", &pr.number.to_string()])
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("repo", &self.repo)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
