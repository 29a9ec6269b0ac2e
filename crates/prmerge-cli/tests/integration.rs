//! Integration tests for the prmerge CLI.
//!
//! The hosting APIs are served by mockito; fetches go to local repositories
//! through `file://` remotes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tempfile::TempDir;

/// Run git in `dir`, panicking on failure.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_user(dir: &Path) {
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test User"]);
}

/// Commit `content` to `file` on the current branch.
fn commit_file(dir: &Path, file: &str, content: &str, msg: &str) {
    fs::write(dir.join(file), content).expect("Failed to write file");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", msg]);
}

/// Layout of a GitHub-like setup:
///
/// - `seed/`: where pull request heads are authored
/// - `web/yuzu-emu/yuzu.git`: mirror of `seed`, the fetch remote
/// - `work/`: clone of `seed`, the working tree merged into
struct Fixture {
    temp: TempDir,
}

/// A pull request head: branch off `main` writing `content` to `file`.
struct Head {
    number: u64,
    branch: &'static str,
    file: &'static str,
    content: &'static str,
}

impl Fixture {
    /// PR 7 adds `audio.txt`, PR 8 adds `docs.txt`.
    fn new() -> Self {
        Self::with_heads(&[
            Head {
                number: 7,
                branch: "audio-fix",
                file: "audio.txt",
                content: "fixed\n",
            },
            Head {
                number: 8,
                branch: "docs",
                file: "docs.txt",
                content: "docs\n",
            },
        ])
    }

    fn with_heads(heads: &[Head]) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let seed = temp.path().join("seed");
        fs::create_dir(&seed).unwrap();

        git(&seed, &["init"]);
        configure_user(&seed);
        commit_file(&seed, "README.md", "# Test Repo\n", "Initial commit");
        git(&seed, &["branch", "-M", "main"]);

        // Published like GitHub does under refs/pull
        for head in heads {
            git(&seed, &["checkout", "-b", head.branch, "main"]);
            let msg = format!("Change {}", head.file);
            commit_file(&seed, head.file, head.content, &msg);
            let pull_ref = format!("refs/pull/{}/head", head.number);
            git(&seed, &["update-ref", &pull_ref, head.branch]);
        }
        git(&seed, &["checkout", "main"]);

        let owner_dir = temp.path().join("web").join("yuzu-emu");
        fs::create_dir_all(&owner_dir).unwrap();
        git(
            temp.path(),
            &[
                "clone",
                "--mirror",
                seed.to_str().unwrap(),
                owner_dir.join("yuzu.git").to_str().unwrap(),
            ],
        );

        git(
            temp.path(),
            &["clone", seed.to_str().unwrap(), "work"],
        );
        configure_user(&temp.path().join("work"));

        Self { temp }
    }

    fn work(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    fn web_url(&self) -> String {
        format!("file://{}", self.temp.path().join("web").display())
    }
}

/// Check whether `reference` resolves in `dir`.
fn has_ref(dir: &Path, reference: &str) -> bool {
    StdCommand::new("git")
        .args(["rev-parse", "--verify", "--quiet", reference])
        .current_dir(dir)
        .output()
        .unwrap()
        .status
        .success()
}

/// Empty git repository with one commit on `main`.
fn setup_git_repo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    git(temp.path(), &["init"]);
    configure_user(temp.path());
    commit_file(temp.path(), "README.md", "# Test Repo\n", "Initial commit");
    git(temp.path(), &["branch", "-M", "main"]);
    temp
}

const PAGE_ONE: &str = r#"[
    {"number": 7, "title": "Fix audio", "head": {"ref": "audio-fix"},
     "labels": [{"name": "backport"}, {"name": "bug"}]},
    {"number": 8, "title": "Docs", "head": {"ref": "docs"},
     "labels": [{"name": "bug"}]}
]"#;

fn mock_github_pages(server: &mut mockito::ServerGuard) -> (mockito::Mock, mockito::Mock) {
    let page_one = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PAGE_ONE)
        .create();
    let page_two = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create();
    (page_one, page_two)
}

/// Helper to get prmerge command with a clean environment.
fn prmerge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_prmerge"));
    for var in [
        "GITHUB_TOKEN",
        "PRIVATEMERGEORG",
        "PRIVATEMERGEREPO",
        "MERGETAGLINEPRIVATE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn test_version_flag() {
    prmerge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prmerge"));
}

#[test]
fn test_help_flag() {
    prmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("azure"))
        .stdout(predicate::str::contains("--on-http-error"));
}

#[test]
fn test_no_subcommand_shows_help() {
    prmerge()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_github_requires_label() {
    prmerge()
        .arg("github")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<LABEL>"));
}

// ============================================================================
// GitHub end-to-end
// ============================================================================

#[test]
fn test_github_merges_labelled_pull_request() {
    let fixture = Fixture::new();
    let mut server = mockito::Server::new();
    let (page_one, page_two) = mock_github_pages(&mut server);

    prmerge()
        .args(["github", "backport", "EA"])
        .args(["--api-url", &server.url()])
        .args(["--web-url", &fixture.web_url()])
        .arg("--root")
        .arg(fixture.work())
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged"))
        .stdout(predicate::str::contains("#7"));

    page_one.assert();
    page_two.assert();

    let work = fixture.work();
    assert_eq!(git(&work, &["log", "-1", "--format=%s"]), "Merge EA PR 7");
    assert!(work.join("audio.txt").exists());
    assert!(!work.join("docs.txt").exists());
    assert!(has_ref(&work, "refs/heads/pr-7"));
    assert!(!has_ref(&work, "refs/heads/pr-8"));
}

#[test]
fn test_conflict_stops_run_and_keeps_earlier_merge() {
    let fixture = Fixture::with_heads(&[
        Head {
            number: 21,
            branch: "readme-a",
            file: "README.md",
            content: "# Edited by A\n",
        },
        Head {
            number: 22,
            branch: "readme-b",
            file: "README.md",
            content: "# Edited by B\n",
        },
        Head {
            number: 23,
            branch: "extra",
            file: "extra.txt",
            content: "extra\n",
        },
    ]);
    let mut server = mockito::Server::new();
    let page_one = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(
            r#"[
                {"number": 21, "title": "A", "head": {"ref": "readme-a"},
                 "labels": [{"name": "backport"}]},
                {"number": 22, "title": "B", "head": {"ref": "readme-b"},
                 "labels": [{"name": "backport"}]},
                {"number": 23, "title": "C", "head": {"ref": "extra"},
                 "labels": [{"name": "backport"}]}
            ]"#,
        )
        .create();
    let page_two = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .expect(0)
        .create();

    let assert = prmerge()
        .args(["github", "backport"])
        .args(["--api-url", &server.url()])
        .args(["--web-url", &fixture.web_url()])
        .arg("--root")
        .arg(fixture.work())
        .assert()
        .failure()
        .stdout(predicate::str::contains("#22"));

    #[cfg(unix)]
    assert.code(255);
    #[cfg(not(unix))]
    drop(assert);

    page_one.assert();
    page_two.assert();

    let work = fixture.work();
    assert_eq!(git(&work, &["log", "-1", "--format=%s"]), "Merge PR 21");
    assert_eq!(git(&work, &["log", "-1", "--format=%s", "HEAD~1"]), "Initial commit");
    assert_eq!(git(&work, &["show", "HEAD:README.md"]), "# Edited by A");
    assert!(has_ref(&work, "refs/heads/pr-22"));
    assert!(!has_ref(&work, "refs/heads/pr-23"));
    assert!(!work.join("extra.txt").exists());
}

#[test]
fn test_github_rerun_refetches_over_stale_branch() {
    let fixture = Fixture::new();
    let work = fixture.work();
    // Stale local pr-7 that the forced fetch has to overwrite
    git(&work, &["branch", "pr-7"]);

    let mut server = mockito::Server::new();
    let _pages = mock_github_pages(&mut server);

    prmerge()
        .args(["github", "backport"])
        .args(["--api-url", &server.url()])
        .args(["--web-url", &fixture.web_url()])
        .arg("--root")
        .arg(&work)
        .assert()
        .success();

    assert_eq!(git(&work, &["log", "-1", "--format=%s"]), "Merge PR 7");
    assert!(work.join("audio.txt").exists());
}

#[test]
fn test_github_dry_run_json_report() {
    let fixture = Fixture::new();
    let mut server = mockito::Server::new();
    let _pages = mock_github_pages(&mut server);
    let head_before = git(&fixture.work(), &["rev-parse", "HEAD"]);

    let output = prmerge()
        .args(["github", "backport", "EA", "--dry-run", "--json"])
        .args(["--api-url", &server.url()])
        .args(["--web-url", &fixture.web_url()])
        .arg("--root")
        .arg(fixture.work())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["backend"], "GitHub");
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["scanned"], 2);
    assert_eq!(report["merges"][0]["number"], 7);
    assert_eq!(report["merges"][0]["message"], "Merge EA PR 7");
    assert_eq!(report["merges"].as_array().unwrap().len(), 1);

    assert_eq!(git(&fixture.work(), &["rev-parse", "HEAD"]), head_before);
}

#[test]
fn test_http_error_fails_by_default() {
    let repo = setup_git_repo();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create();

    let assert = prmerge()
        .args(["github", "backport"])
        .args(["--api-url", &server.url()])
        .arg("--root")
        .arg(repo.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("HTTP 500"));

    #[cfg(unix)]
    assert.code(255);
    #[cfg(not(unix))]
    drop(assert);

    mock.assert();
}

#[test]
fn test_http_error_skip_walks_page_cap() {
    let repo = setup_git_repo();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(29)
        .create();

    prmerge()
        .args(["github", "backport", "--on-http-error", "skip"])
        .args(["--api-url", &server.url()])
        .arg("--root")
        .arg(repo.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping"))
        .stdout(predicate::str::contains("No open pull requests"));

    mock.assert();
}

#[test]
fn test_max_pages_flag() {
    let repo = setup_git_repo();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::Any)
        .with_status(502)
        .expect(3)
        .create();

    prmerge()
        .args(["--max-pages", "3", "github", "backport"])
        .args(["--on-http-error", "skip"])
        .args(["--api-url", &server.url()])
        .arg("--root")
        .arg(repo.path())
        .assert()
        .success();

    mock.assert();
}

// ============================================================================
// Azure DevOps
// ============================================================================

#[test]
fn test_azure_dry_run_uses_label_lookups() {
    let repo = setup_git_repo();
    let mut server = mockito::Server::new();
    let listing = server
        .mock("GET", "/acme/secret/_apis/git/pullrequests")
        .match_query(Matcher::UrlEncoded("api-version".into(), "5.1".into()))
        .match_header("authorization", "Basic Ym90OnBhdA==")
        .with_status(200)
        .with_body(
            r#"{"value": [
                {"pullRequestId": 101, "title": "Secret fix",
                 "sourceRefName": "refs/heads/secret-fix",
                 "repository": {"id": "repo-id"}},
                {"pullRequestId": 102, "title": "Other",
                 "sourceRefName": "refs/heads/other",
                 "repository": {"id": "repo-id"}}
            ], "count": 2}"#,
        )
        .create();
    let labels_101 = server
        .mock(
            "GET",
            "/acme/secret/_apis/git/repositories/repo-id/pullRequests/101/labels",
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"value": [{"name": "early-access"}], "count": 1}"#)
        .create();
    let labels_102 = server
        .mock(
            "GET",
            "/acme/secret/_apis/git/repositories/repo-id/pullRequests/102/labels",
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"value": [], "count": 0}"#)
        .create();

    let output = prmerge()
        .args(["azure", "bot:pat@", "early-access"])
        .arg(repo.path())
        .args(["--api-url", &server.url(), "--dry-run", "--json"])
        .env("PRIVATEMERGEORG", "acme")
        .env("PRIVATEMERGEREPO", "secret")
        .env("MERGETAGLINEPRIVATE", "EA")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );

    listing.assert();
    labels_101.assert();
    labels_102.assert();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["backend"], "Azure DevOps");
    assert_eq!(report["merges"].as_array().unwrap().len(), 1);
    assert_eq!(report["merges"][0]["number"], 101);
    assert_eq!(report["merges"][0]["message"], "Private Merge EA - 101");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("pat"));
}

/// Layout of an Azure DevOps-like setup with a submodule:
///
/// - `sub/`: the submodule's upstream
/// - `seed/`: superproject; branch `secret-fix` bumps the submodule and
///   adds `secret.txt`
/// - `git/acme/_git/secret`: mirror of `seed`, the fetch remote
/// - `work/`: clone of `seed` taken before `secret-fix` existed
struct AzureFixture {
    temp: TempDir,
    /// Submodule commit only reachable through `secret-fix`.
    sub_head: String,
}

impl AzureFixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let sub = temp.path().join("sub");
        let seed = temp.path().join("seed");
        fs::create_dir(&sub).unwrap();
        fs::create_dir(&seed).unwrap();

        git(&sub, &["init"]);
        configure_user(&sub);
        commit_file(&sub, "lib.txt", "v1\n", "Library v1");
        git(&sub, &["branch", "-M", "main"]);

        git(&seed, &["init"]);
        configure_user(&seed);
        commit_file(&seed, "README.md", "# Private\n", "Initial commit");
        git(&seed, &["branch", "-M", "main"]);
        git(
            &seed,
            &[
                "-c",
                "protocol.file.allow=always",
                "submodule",
                "add",
                sub.to_str().unwrap(),
                "externals/sub",
            ],
        );
        git(&seed, &["commit", "-m", "Add submodule"]);

        git(
            temp.path(),
            &[
                "-c",
                "protocol.file.allow=always",
                "clone",
                "--recurse-submodules",
                seed.to_str().unwrap(),
                "work",
            ],
        );
        configure_user(&temp.path().join("work"));

        commit_file(&sub, "lib.txt", "v2\n", "Library v2");
        let sub_head = git(&sub, &["rev-parse", "HEAD"]);

        git(&seed, &["checkout", "-b", "secret-fix"]);
        let checkout = seed.join("externals").join("sub");
        git(&checkout, &["pull", "origin", "main"]);
        fs::write(seed.join("secret.txt"), "secret\n").unwrap();
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "-m", "Secret fix"]);
        git(&seed, &["checkout", "main"]);

        let org_dir = temp.path().join("git").join("acme").join("_git");
        fs::create_dir_all(&org_dir).unwrap();
        git(
            temp.path(),
            &[
                "clone",
                "--mirror",
                seed.to_str().unwrap(),
                org_dir.join("secret").to_str().unwrap(),
            ],
        );

        Self { temp, sub_head }
    }

    fn work(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    fn git_url(&self) -> String {
        format!("file://{}", self.temp.path().join("git").display())
    }
}

#[test]
fn test_azure_merges_with_submodules() {
    let fixture = AzureFixture::new();
    let mut server = mockito::Server::new();
    let listing = server
        .mock("GET", "/acme/secret/_apis/git/pullrequests")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"value": [
                {"pullRequestId": 101, "title": "Secret fix",
                 "sourceRefName": "refs/heads/secret-fix",
                 "repository": {"id": "repo-id"}}
            ], "count": 1}"#,
        )
        .create();
    let labels = server
        .mock(
            "GET",
            "/acme/secret/_apis/git/repositories/repo-id/pullRequests/101/labels",
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"value": [{"name": "early-access"}], "count": 1}"#)
        .create();

    let work = fixture.work();
    prmerge()
        .args(["azure", "", "early-access"])
        .arg(&work)
        .args(["--api-url", &server.url()])
        .args(["--git-url", &fixture.git_url()])
        .env("PRIVATEMERGEORG", "acme")
        .env("PRIVATEMERGEREPO", "secret")
        .env("MERGETAGLINEPRIVATE", "EA")
        // Submodule fetches go through file:// as well
        .env("GIT_CONFIG_COUNT", "1")
        .env("GIT_CONFIG_KEY_0", "protocol.file.allow")
        .env("GIT_CONFIG_VALUE_0", "always")
        .assert()
        .success()
        .stdout(predicate::str::contains("#101"));

    listing.assert();
    labels.assert();

    assert_eq!(
        git(&work, &["log", "-1", "--format=%s"]),
        "Private Merge EA - 101"
    );
    assert!(has_ref(&work, "refs/heads/pr-101"));
    assert!(work.join("secret.txt").exists());
    // Only present if the fetch recursed into the submodule
    let checkout = work.join("externals").join("sub");
    git(&checkout, &["cat-file", "-e", &fixture.sub_head]);
}

// ============================================================================
// Preflight and configuration
// ============================================================================

#[test]
fn test_refuses_detached_head() {
    let repo = setup_git_repo();
    git(repo.path(), &["checkout", "--detach"]);

    prmerge()
        .args(["github", "backport", "--api-url", "http://127.0.0.1:9"])
        .arg("--root")
        .arg(repo.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("detached"));
}

#[test]
fn test_not_a_git_repository() {
    let temp = TempDir::new().unwrap();

    prmerge()
        .args(["github", "backport", "--api-url", "http://127.0.0.1:9"])
        .arg("--root")
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Not inside a git repository"));
}

#[test]
fn test_config_file_unknown_key_rejected() {
    let repo = setup_git_repo();
    let config = repo.path().join("prmerge.toml");
    fs::write(&config, "max_page = 3\n").unwrap();

    prmerge()
        .args(["github", "backport"])
        .arg("--config")
        .arg(&config)
        .arg("--root")
        .arg(repo.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid config file"));
}

#[test]
fn test_config_file_sets_page_cap() {
    let repo = setup_git_repo();
    let config = repo.path().join("prmerge.toml");
    fs::write(&config, "max_pages = 2\non_http_error = \"skip\"\n").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/repos/yuzu-emu/yuzu/pulls")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create();

    prmerge()
        .args(["github", "backport", "--api-url", &server.url()])
        .arg("--config")
        .arg(&config)
        .arg("--root")
        .arg(repo.path())
        .assert()
        .success();

    mock.assert();
}
