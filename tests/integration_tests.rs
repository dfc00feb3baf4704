//! Integration tests for the automerge binary

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

use assert_cmd::Command;
use predicates::prelude::*;

const SETTINGS_ENV: &[&str] = &[
    "GITHUB_REPOSITORY",
    "GITHUB_TOKEN",
    "GH_TOKEN",
    "GITHUB_API_URL",
    "GITHUB_SERVER_URL",
    "MERGE_LABELS",
    "BLOCK_LABELS",
    "MERGE_FORKS",
    "AUTO_UPDATE",
    "MERGE_WHEN_BEHIND",
    "CLOSE_ON_CONFLICT",
    "DELETE_BRANCH_ON_CLOSE",
    "FALLBACK_TO_MERGE",
    "MERGE_METHOD",
    "AUTOMERGE_LOG",
];

/// The binary with no settings inherited from the test environment
fn automerge() -> Command {
    let mut cmd = Command::cargo_bin("automerge").unwrap();
    for var in SETTINGS_ENV {
        cmd.env_remove(var);
    }
    cmd
}

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_help() {
    automerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("labelled GitHub pull requests"))
        .stdout(predicate::str::contains("--close-on-conflict"));
}

#[test]
fn test_cli_version() {
    automerge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_repository_fails() {
    automerge()
        .args(["--token", "ghp_test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No repository given"));
}

#[test]
fn test_overlapping_labels_fail() {
    automerge()
        .args(["--repository", "owner/repo", "--token", "ghp_test"])
        .env("MERGE_LABELS", "automerge,wip")
        .env("BLOCK_LABELS", "wip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wip"));
}

#[test]
fn test_unknown_merge_method_fails() {
    automerge()
        .args(["run", "--repository", "owner/repo", "--token", "ghp_test"])
        .args(["--merge-method", "octopus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("octopus"));
}

#[test]
fn test_invalid_boolean_fails() {
    automerge()
        .args(["--repository", "owner/repo", "--token", "ghp_test"])
        .env("CLOSE_ON_CONFLICT", "sometimes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("close-on-conflict"));
}

#[test]
fn test_missing_token_fails() {
    // An empty PATH hides any installed `gh` CLI
    let empty_path = tempfile::tempdir().unwrap();

    automerge()
        .args(["--repository", "owner/repo"])
        .env("PATH", empty_path.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No GitHub token"));
}

#[test]
fn test_missing_config_file_fails() {
    automerge()
        .args(["--repository", "owner/repo", "--token", "ghp_test"])
        .args(["--config", "/nonexistent/automerge.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("automerge.toml"));
}

#[test]
fn test_empty_repository_succeeds() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/repos/owner/repo/pulls")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();

    automerge()
        .args(["--repository", "owner/repo", "--token", "ghp_test"])
        .args(["--api-url", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No open pull requests"));

    mock.assert();
}

#[test]
fn test_empty_repository_json_summary() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/repos/owner/repo/pulls")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();

    automerge()
        .args(["--repository", "owner/repo", "--token", "ghp_test", "--json"])
        .args(["--api-url", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"open\": 0"));
}
