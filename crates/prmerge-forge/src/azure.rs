//! Azure DevOps API client.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::auth::{Credential, redact_url};
use crate::backend::{Backend, compose_message};
use crate::error::{Error, Result};
use crate::http;
use crate::types::{ClientOptions, FetchSource, Fetched, Pagination, PullRequest, RepoSlug};

const PULL_REQUESTS_API_VERSION: &str = "5.1";
const LABELS_API_VERSION: &str = "5.1-preview.1";

/// Azure DevOps list responses wrap their items in `value`.
#[derive(Deserialize)]
struct ValueList<T> {
    value: Vec<T>,
}

/// Azure DevOps API client for one organization/repository.
///
/// Pull request labels are not part of the listing, so every pull
/// request costs one extra request in [`Backend::fetch_labels`].
pub struct AzureClient {
    client: Client,
    api_url: String,
    git_url: Option<String>,
    repo: RepoSlug,
    credential: Option<Credential>,
}

impl AzureClient {
    /// Default Azure DevOps URL.
    pub const DEFAULT_API_URL: &'static str = "https://dev.azure.com";

    /// Create a new Azure DevOps client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(
        repo: RepoSlug,
        credential: Option<Credential>,
        options: &ClientOptions,
    ) -> Result<Self> {
        let client = http::build_client("application/json", options)?;

        Ok(Self {
            client,
            api_url: Self::DEFAULT_API_URL.to_string(),
            git_url: None,
            repo,
            credential,
        })
    }

    /// Use a custom base URL (on-premises server, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch from a different base URL than the API (mirrors, tests).
    #[must_use]
    pub fn with_git_url(mut self, git_url: impl Into<String>) -> Self {
        self.git_url = Some(git_url.into().trim_end_matches('/').to_string());
        self
    }

    fn api_base(&self) -> String {
        format!("{}/{}/{}/_apis/git", self.api_url, self.repo.owner, self.repo.name)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        api_version: &str,
    ) -> Result<Fetched<T>> {
        let mut request = self
            .client
            .get(url)
            .query(&[("api-version", api_version)]);
        if let Some(credential) = &self.credential {
            request = credential.apply(request);
        }

        let response = request.send().await?;
        http::decode(url, response).await
    }

    /// List active pull requests.
    ///
    /// # Errors
    /// Returns error on transport failure or a malformed body.
    pub async fn list_all(&self) -> Result<Fetched<Vec<PullRequest>>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ApiPr {
            pull_request_id: u64,
            #[serde(default)]
            title: String,
            source_ref_name: String,
            repository: ApiRepository,
        }

        #[derive(Deserialize)]
        struct ApiRepository {
            id: String,
        }

        let url = format!("{}/pullrequests", self.api_base());
        let listing: Fetched<ValueList<ApiPr>> = self.get(&url, PULL_REQUESTS_API_VERSION).await?;

        Ok(listing
            .map(|listing| {
                listing
                    .value
                    .into_iter()
                    .map(|api_pr| PullRequest {
                        number: api_pr.pull_request_id,
                        title: api_pr.title,
                        source_ref: api_pr.source_ref_name,
                        repository_id: Some(api_pr.repository.id),
                        labels: None,
                    })
                    .collect()
            })
            .non_empty())
    }

    /// Get the label names of one pull request.
    ///
    /// # Errors
    /// Returns error on transport failure or a malformed body.
    pub async fn labels(&self, repository_id: &str, pr_number: u64) -> Result<Fetched<Vec<String>>> {
        #[derive(Deserialize)]
        struct ApiLabel {
            name: String,
        }

        let url = format!(
            "{}/repositories/{repository_id}/pullRequests/{pr_number}/labels",
            self.api_base()
        );
        let labels: Fetched<ValueList<ApiLabel>> = self.get(&url, LABELS_API_VERSION).await?;

        Ok(labels.map(|labels| labels.value.into_iter().map(|l| l.name).collect()))
    }
}

#[async_trait]
impl Backend for AzureClient {
    fn name(&self) -> &'static str {
        "Azure DevOps"
    }

    fn pagination(&self) -> Pagination {
        Pagination::Single
    }

    async fn list_pull_requests(&self, _page: Option<u32>) -> Result<Fetched<Vec<PullRequest>>> {
        self.list_all().await
    }

    async fn fetch_labels(&self, pr: &PullRequest) -> Result<Fetched<Vec<String>>> {
        if let Some(labels) = &pr.labels {
            return Ok(Fetched::Data(labels.clone()));
        }
        // Listing always carries the repository id; fall back to the name
        let repository_id = pr.repository_id.as_deref().unwrap_or(&self.repo.name);
        self.labels(repository_id, pr.number).await
    }

    fn fetch_source(&self, pr: &PullRequest) -> Result<FetchSource> {
        let base = self.git_url.as_deref().unwrap_or(&self.api_url);
        let raw = format!("{base}/{}/_git/{}", self.repo.owner, self.repo.name);
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
        if let Some(credential) = &self.credential {
            credential.embed(&mut url)?;
        }

        Ok(FetchSource {
            display_remote: redact_url(&url),
            remote: url.to_string(),
            source_ref: pr.source_ref.clone(),
            recurse_submodules: true,
        })
    }

    fn commit_message(&self, tagline: &str, pr: &PullRequest) -> String {
        compose_message(&["Private Merge", tagline, "-", &pr.number.to_string()])
    }
}

impl std::fmt::Debug for AzureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureClient")
            .field("api_url", &self.api_url)
            .field("git_url", &self.git_url)
            .field("repo", &self.repo)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
