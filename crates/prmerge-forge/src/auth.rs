//! Authentication for hosting APIs and git remotes.

use std::fmt;

use reqwest::{RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};

/// GitHub authentication.
///
/// The public listing works anonymously; a token only lifts rate limits.
#[derive(Debug, Default)]
pub enum Auth {
    /// No credentials.
    #[default]
    Anonymous,
    /// Personal access token or `GITHUB_TOKEN`.
    Token(SecretString),
}

impl Auth {
    /// Build from an optional token, treating an empty token as anonymous.
    #[must_use]
    pub fn from_token(token: Option<SecretString>) -> Self {
        match token {
            Some(token) if !token.expose_secret().trim().is_empty() => Self::Token(token),
            _ => Self::Anonymous,
        }
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Anonymous => request,
            Self::Token(token) => request.bearer_auth(token.expose_secret()),
        }
    }
}

/// Azure DevOps credential prefix, as in `user:token@`.
///
/// Sent as basic auth on API calls and embedded in the userinfo part of
/// git remote URLs.
pub struct Credential {
    username: String,
    password: Option<SecretString>,
}

impl Credential {
    /// Parse a `user:token@` style prefix.
    ///
    /// The trailing `@` is optional. Returns `None` for an empty prefix.
    #[must_use]
    pub fn parse(prefix: &str) -> Option<Self> {
        let trimmed = prefix.trim();
        let trimmed = trimmed.strip_suffix('@').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return None;
        }

        let credential = match trimmed.split_once(':') {
            Some((username, password)) => Self {
                username: username.to_string(),
                password: Some(SecretString::from(password.to_string())),
            },
            None => Self {
                username: trimmed.to_string(),
                password: None,
            },
        };
        Some(credential)
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(
            &self.username,
            self.password.as_ref().map(ExposeSecret::expose_secret),
        )
    }

    /// Embed the credential into a URL's userinfo.
    ///
    /// # Errors
    /// Returns error if the URL cannot carry credentials.
    pub fn embed(&self, url: &mut Url) -> Result<()> {
        url.set_username(&self.username)
            .map_err(|()| Error::InvalidCredential(format!("cannot set username on {url}")))?;
        url.set_password(self.password.as_ref().map(ExposeSecret::expose_secret))
            .map_err(|()| Error::InvalidCredential("cannot set password on URL".into()))?;
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Render a URL without its userinfo.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    if url.username().is_empty() && url.password().is_none() {
        return url.to_string();
    }

    let mut redacted = url.clone();
    let _ = redacted.set_password(None);
    let _ = redacted.set_username("***");
    redacted.to_string()
}
