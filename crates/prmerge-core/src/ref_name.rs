//! Ref name validation and newtype.
//!
//! Source refs come from a hosting API and end up in a `git fetch`
//! refspec, so they are checked before use. [`RefName`] enforces git's
//! ref naming rules and rejects anything git would read as an option.
//! git is never run through a shell, so shell metacharacters are allowed.

use std::fmt;

use crate::error::{Error, Result};

/// A validated git ref name.
///
/// # Examples
///
/// ```
/// use prmerge_core::RefName;
///
/// assert!(RefName::new("refs/heads/feature").is_ok());
/// assert!(RefName::new("pull/42/head").is_ok());
/// assert_eq!(RefName::for_pull_request(42).as_str(), "pr-42");
///
/// assert!(RefName::new("--upload-pack=evil").is_err());
/// assert!(RefName::new("main:refs/heads/main").is_err());
/// assert!(RefName::new("a..b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRefName`] if the name violates git's ref
    /// naming rules or could be read as an option.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    /// Local branch a pull request is fetched into: `pr-<number>`.
    #[must_use]
    pub fn for_pull_request(number: u64) -> Self {
        Self(format!("pr-{number}"))
    }

    /// Get the ref name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for RefName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for RefName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> Error {
    Error::InvalidRefName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a ref name against `git check-ref-format` rules.
fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "ref name cannot be empty"));
    }

    if name == "@" {
        return Err(invalid(name, "ref name cannot be '@'"));
    }

    // Would be parsed as an option by git
    if name.starts_with('-') {
        return Err(invalid(name, "ref name cannot start with '-'"));
    }

    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid(name, "ref name cannot start or end with '.'"));
    }

    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    if name.ends_with(".lock") {
        return Err(invalid(name, "ref name cannot end with '.lock'"));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid(name, "ref name cannot start or end with '/'"));
    }

    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();

        if c.is_ascii_control() {
            return Err(invalid(name, "ref name cannot contain control characters"));
        }

        // ':' would also split the refspec
        if matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\') {
            return Err(invalid(name, format!("ref name cannot contain '{c}'")));
        }

        match (c, next) {
            ('.', Some('.')) => return Err(invalid(name, "ref name cannot contain '..'")),
            ('/', Some('/')) => return Err(invalid(name, "ref name cannot contain '//'")),
            ('/', Some('.')) => {
                return Err(invalid(name, "ref name component cannot start with '.'"));
            }
            ('@', Some('{')) => return Err(invalid(name, "ref name cannot contain '@{'")),
            _ => {}
        }
    }

    Ok(())
}
