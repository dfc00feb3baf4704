//! Authentication for GitHub
//!
//! Supports an explicit token, environment variables and the `gh` CLI.

mod github;

pub use github::{GitHubAuthConfig, get_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token passed on the command line or via `GITHUB_TOKEN`
    Explicit,
    /// Token from the `GH_TOKEN` environment variable
    EnvVar,
    /// Token from the `gh` CLI
    Cli,
}
