//! Repository wrapper providing the operations the merge pipeline needs.

use std::path::Path;
use std::process::Command;

use git2::RepositoryState;

use crate::error::{Error, Result};

/// Flags for [`Repository::fetch`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Pass `-f` so a non-fast-forward update of the destination ref is accepted.
    pub force: bool,
    /// Recurse into submodules (`--no-recurse-submodules` when false).
    pub recurse_submodules: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            force: true,
            recurse_submodules: true,
        }
    }
}

/// Committer identity applied with `git -c user.name=… -c user.email=…`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// `user.name`
    pub name: String,
    /// `user.email`
    pub email: String,
}

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path)?;
        Ok(Self { inner })
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// Ensure no merge, rebase, cherry-pick or similar is in progress.
    ///
    /// # Errors
    /// Returns `OperationInProgress` if the repository is busy.
    pub fn require_idle(&self) -> Result<()> {
        match self.inner.state() {
            RepositoryState::Clean => Ok(()),
            other => Err(Error::OperationInProgress(format!("{other:?}"))),
        }
    }

    /// Get the name of the current branch.
    ///
    /// # Errors
    /// Returns error if HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }

        head.shorthand()
            .map(String::from)
            .ok_or(Error::DetachedHead)
    }

    /// Abbreviated commit id a reference points at.
    ///
    /// # Errors
    /// Returns error if the reference cannot be resolved.
    pub fn short_rev(&self, reference: &str) -> Result<String> {
        let object = self
            .inner
            .revparse_single(reference)
            .map_err(|_| Error::RefNotFound(reference.to_string()))?;
        let short = object.short_id()?;

        short
            .as_str()
            .map(String::from)
            .ok_or_else(|| Error::RefNotFound(reference.to_string()))
    }

    // === Merge operations ===

    /// Fetch `refspec` from `remote`.
    ///
    /// `display_remote` replaces `remote` in error messages so credentials
    /// embedded in the URL are never reported. Returns captured stdout.
    ///
    /// # Errors
    /// Returns error if git exits with a non-zero status.
    pub fn fetch(
        &self,
        remote: &str,
        display_remote: &str,
        refspec: &str,
        options: FetchOptions,
    ) -> Result<String> {
        let mut flags: Vec<&str> = Vec::new();
        if options.force {
            flags.push("-f");
        }
        if !options.recurse_submodules {
            flags.push("--no-recurse-submodules");
        }

        let mut args = vec!["fetch"];
        args.extend(&flags);
        args.extend([remote, refspec]);

        let mut shown = vec!["git", "fetch"];
        shown.extend(&flags);
        shown.extend([display_remote, refspec]);

        self.run_git(&args, &shown.join(" ")).map_err(|e| match e {
            Error::CommandFailed {
                command,
                status,
                stderr,
            } => Error::CommandFailed {
                command,
                status,
                stderr: stderr.replace(remote, display_remote),
            },
            other => other,
        })
    }

    /// Squash-merge `reference` into the current branch without committing.
    ///
    /// # Errors
    /// Returns error if the merge fails or conflicts.
    pub fn merge_squash(&self, reference: &str) -> Result<String> {
        let args = ["merge", "--squash", reference];
        self.run_git(&args, &format!("git {}", args.join(" ")))
    }

    /// Commit the staged changes.
    ///
    /// # Errors
    /// Returns error if there is nothing to commit or git fails.
    pub fn commit(&self, message: &str, identity: Option<&Identity>) -> Result<String> {
        let overrides = identity.map(|id| {
            [
                format!("user.name={}", id.name),
                format!("user.email={}", id.email),
            ]
        });

        let mut args: Vec<&str> = Vec::new();
        if let Some([name, email]) = &overrides {
            args.extend(["-c", name.as_str(), "-c", email.as_str()]);
        }
        args.extend(["commit", "-m", message]);

        self.run_git(&args, &format!("git commit -m {message:?}"))
    }

    fn run_git(&self, args: &[&str], shown: &str) -> Result<String> {
        let workdir = self.workdir().ok_or(Error::BareRepository)?;

        let output = Command::new("git")
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(Error::Spawn)?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        // git reports "nothing to commit" on stdout
        let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }

        Err(Error::CommandFailed {
            command: shown.to_string(),
            status: output.status.to_string(),
            stderr,
        })
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}
