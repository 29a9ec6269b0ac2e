//! Run configuration.
//!
//! Every option is resolved once at startup: built-in defaults, then an
//! optional TOML file, then command-line/environment overrides. The result
//! is passed down explicitly; nothing below the CLI reads the environment.
//!
//! ```toml
//! label = "early-access-merge"
//! tagline = "EA"
//! max_pages = 29
//! timeout_secs = 30
//! on_http_error = "fail"
//!
//! [identity]
//! name = "yuzubot"
//! email = "bot@example.com"
//!
//! [github]
//! owner = "yuzu-emu"
//! repo = "yuzu"
//!
//! [azure]
//! organization = "yuzu-emu"
//! repo = "yuzu-private"
//! ```

use std::path::Path;
use std::time::Duration;

use prmerge_git::Identity;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::policy::StatusPolicy;

/// Default cap on listing pages for paged backends.
pub const DEFAULT_MAX_PAGES: u32 = 29;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Exact label a pull request must carry to be merged.
    pub label: String,

    /// Free text embedded in merge commit messages.
    pub tagline: String,

    /// Highest page requested from a paged listing (inclusive).
    pub max_pages: u32,

    /// Timeout applied to every HTTP request.
    pub timeout: Duration,

    /// What to do with non-success HTTP statuses.
    pub on_http_error: StatusPolicy,

    /// Discover and filter only; leave the working tree alone.
    pub dry_run: bool,

    /// Committer identity for merge commits; git config when `None`.
    pub identity: Option<Identity>,

    /// GitHub backend settings.
    pub github: GitHubSettings,

    /// Azure DevOps backend settings.
    pub azure: AzureSettings,
}

/// Where the public backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// REST API base URL.
    pub api_url: String,
    /// Base URL for clone remotes.
    pub web_url: String,
}

/// Where the private backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    /// Azure DevOps organization.
    pub organization: String,
    /// Repository name.
    pub repo: String,
    /// Service base URL.
    pub api_url: String,
    /// Base URL for clone remotes; `api_url` when `None`.
    pub git_url: Option<String>,
}

/// One configuration layer; every field is optional.
///
/// Secrets (tokens, credential prefixes) are deliberately absent: they are
/// only accepted from the command line or environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    /// See [`Config::label`].
    pub label: Option<String>,
    /// See [`Config::tagline`].
    pub tagline: Option<String>,
    /// See [`Config::max_pages`].
    pub max_pages: Option<u32>,
    /// See [`Config::timeout`].
    pub timeout_secs: Option<u64>,
    /// See [`Config::on_http_error`].
    pub on_http_error: Option<StatusPolicy>,
    /// See [`Config::dry_run`].
    pub dry_run: Option<bool>,
    /// See [`Config::identity`].
    pub identity: Option<IdentitySection>,
    /// GitHub overrides.
    pub github: GitHubSection,
    /// Azure DevOps overrides.
    pub azure: AzureSection,
}

/// `[identity]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    /// `user.name` for merge commits.
    pub name: String,
    /// `user.email` for merge commits.
    pub email: String,
}

/// `[github]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    /// See [`GitHubSettings::owner`].
    pub owner: Option<String>,
    /// See [`GitHubSettings::repo`].
    pub repo: Option<String>,
    /// See [`GitHubSettings::api_url`].
    pub api_url: Option<String>,
    /// See [`GitHubSettings::web_url`].
    pub web_url: Option<String>,
}

/// `[azure]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AzureSection {
    /// See [`AzureSettings::organization`].
    pub organization: Option<String>,
    /// See [`AzureSettings::repo`].
    pub repo: Option<String>,
    /// See [`AzureSettings::api_url`].
    pub api_url: Option<String>,
    /// See [`AzureSettings::git_url`].
    pub git_url: Option<String>,
}

impl PartialConfig {
    /// Load a layer from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `over` on top of `self`; values set in `over` win.
    #[must_use]
    pub fn overlay(self, over: Self) -> Self {
        Self {
            label: over.label.or(self.label),
            tagline: over.tagline.or(self.tagline),
            max_pages: over.max_pages.or(self.max_pages),
            timeout_secs: over.timeout_secs.or(self.timeout_secs),
            on_http_error: over.on_http_error.or(self.on_http_error),
            dry_run: over.dry_run.or(self.dry_run),
            identity: over.identity.or(self.identity),
            github: GitHubSection {
                owner: over.github.owner.or(self.github.owner),
                repo: over.github.repo.or(self.github.repo),
                api_url: over.github.api_url.or(self.github.api_url),
                web_url: over.github.web_url.or(self.github.web_url),
            },
            azure: AzureSection {
                organization: over.azure.organization.or(self.azure.organization),
                repo: over.azure.repo.or(self.azure.repo),
                api_url: over.azure.api_url.or(self.azure.api_url),
                git_url: over.azure.git_url.or(self.azure.git_url),
            },
        }
    }

    /// Fill in defaults and validate.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if no label is set, or a limit is zero.
    pub fn resolve(self) -> Result<Config> {
        let label = self.label.unwrap_or_default();
        if label.is_empty() {
            return Err(Error::InvalidConfig("a target label is required".into()));
        }

        let max_pages = self.max_pages.unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            return Err(Error::InvalidConfig("max_pages must be at least 1".into()));
        }

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::InvalidConfig("timeout must be at least 1 second".into()));
        }

        Ok(Config {
            label,
            tagline: self.tagline.unwrap_or_default(),
            max_pages,
            timeout: Duration::from_secs(timeout_secs),
            on_http_error: self.on_http_error.unwrap_or_default(),
            dry_run: self.dry_run.unwrap_or(false),
            identity: self.identity.map(|id| Identity {
                name: id.name,
                email: id.email,
            }),
            github: GitHubSettings {
                owner: self.github.owner.unwrap_or_else(|| "yuzu-emu".into()),
                repo: self.github.repo.unwrap_or_else(|| "yuzu".into()),
                api_url: self
                    .github
                    .api_url
                    .unwrap_or_else(|| prmerge_forge::GitHubClient::DEFAULT_API_URL.into()),
                web_url: self
                    .github
                    .web_url
                    .unwrap_or_else(|| prmerge_forge::GitHubClient::DEFAULT_WEB_URL.into()),
            },
            azure: AzureSettings {
                organization: self.azure.organization.unwrap_or_else(|| "yuzu-emu".into()),
                repo: self.azure.repo.unwrap_or_else(|| "yuzu-private".into()),
                api_url: self
                    .azure
                    .api_url
                    .unwrap_or_else(|| prmerge_forge::AzureClient::DEFAULT_API_URL.into()),
                git_url: self.azure.git_url,
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn with_label(label: &str) -> PartialConfig {
        PartialConfig {
            label: Some(label.into()),
            ..PartialConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = with_label("backport").resolve().unwrap();

        assert_eq!(config.label, "backport");
        assert_eq!(config.tagline, "");
        assert_eq!(config.max_pages, 29);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.on_http_error, StatusPolicy::Fail);
        assert!(!config.dry_run);
        assert!(config.identity.is_none());
        assert_eq!(config.github.owner, "yuzu-emu");
        assert_eq!(config.github.repo, "yuzu");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.azure.organization, "yuzu-emu");
        assert_eq!(config.azure.repo, "yuzu-private");
        assert_eq!(config.azure.api_url, "https://dev.azure.com");
        assert_eq!(config.azure.git_url, None);
    }

    #[test]
    fn test_missing_label_rejected() {
        let err = PartialConfig::default().resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = with_label("").resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut partial = with_label("x");
        partial.max_pages = Some(0);
        assert!(partial.resolve().is_err());

        let mut partial = with_label("x");
        partial.timeout_secs = Some(0);
        assert!(partial.resolve().is_err());
    }

    #[test]
    fn test_overlay_prefers_upper_layer() {
        let file = PartialConfig {
            label: Some("from-file".into()),
            tagline: Some("File".into()),
            max_pages: Some(5),
            github: GitHubSection {
                owner: Some("file-owner".into()),
                ..GitHubSection::default()
            },
            ..PartialConfig::default()
        };
        let cli = PartialConfig {
            label: Some("from-cli".into()),
            github: GitHubSection {
                repo: Some("cli-repo".into()),
                ..GitHubSection::default()
            },
            ..PartialConfig::default()
        };

        let config = file.overlay(cli).resolve().unwrap();
        assert_eq!(config.label, "from-cli");
        assert_eq!(config.tagline, "File");
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.github.owner, "file-owner");
        assert_eq!(config.github.repo, "cli-repo");
    }

    #[test]
    fn test_load_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prmerge.toml");
        fs::write(
            &path,
            r#"
label = "early-access-merge"
tagline = "EA"
on_http_error = "skip"

[identity]
name = "yuzubot"
email = "bot@example.com"

[azure]
organization = "acme"
git_url = "https://mirror.example.com"
"#,
        )
        .unwrap();

        let config = PartialConfig::load(&path).unwrap().resolve().unwrap();
        assert_eq!(config.label, "early-access-merge");
        assert_eq!(config.on_http_error, StatusPolicy::Skip);
        assert_eq!(
            config.identity,
            Some(Identity {
                name: "yuzubot".into(),
                email: "bot@example.com".into()
            })
        );
        assert_eq!(config.azure.organization, "acme");
        assert_eq!(config.azure.repo, "yuzu-private");
        assert_eq!(config.azure.api_url, "https://dev.azure.com");
        assert_eq!(
            config.azure.git_url.as_deref(),
            Some("https://mirror.example.com")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prmerge.toml");
        fs::write(&path, "lable = \"typo\"\n").unwrap();

        let err = PartialConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = PartialConfig::load("/nonexistent/prmerge.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
