//! Platform services for GitHub
//!
//! Provides the narrow set of pull request operations the merge bot needs.

mod detection;
mod dry_run;
mod github;

pub use detection::{
    DEFAULT_API_URL, DEFAULT_SERVER_URL, authenticated_clone_url, normalize_base_url,
    parse_repo_info, parse_repo_slug,
};
pub use dry_run::DryRunPlatform;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{MergeMethod, MergeOutcome, PlatformConfig, PullRequest};
use async_trait::async_trait;

/// Platform service trait for pull request operations
///
/// Every call addresses the repository from [`PlatformService::config`].
/// Mutating calls are expected to be idempotent from the caller's point of view.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List open PRs in platform order
    ///
    /// List responses do not carry mergeability; those fields come back as
    /// unknown and are only trustworthy after [`PlatformService::get_pr`].
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>>;

    /// Fetch the current state of a PR
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest>;

    /// Merge a PR using `title` as the commit title
    ///
    /// A refusal because the PR is (no longer) mergeable is reported as
    /// [`MergeOutcome::NotMergeable`], not as an error.
    async fn merge_pr(&self, pr_number: u64, title: &str, method: MergeMethod)
    -> Result<MergeOutcome>;

    /// Close a PR without merging
    async fn close_pr(&self, pr_number: u64) -> Result<()>;

    /// Delete a branch of the configured repository
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Ask GitHub to merge the base branch into the PR's head branch
    async fn update_branch(&self, pr_number: u64) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
