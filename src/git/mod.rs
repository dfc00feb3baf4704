//! Local git operations used to rebase a PR branch
//!
//! The merge bot never reimplements git; it drives the `git` binary through
//! the small [`GitBackend`] capability so tests can substitute a fake.

mod cli;
mod session;

pub use cli::{GitCli, rebase_status_from_output};
pub use session::RebaseSession;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Result of rebasing the checked-out branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseStatus {
    /// All commits applied
    Clean,
    /// A commit could not be applied; the rebase is still in progress
    Conflict,
}

/// Result of a force-push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    /// Remote accepted the push
    Pushed,
    /// Remote refused the push
    Rejected(String),
}

/// Capability interface over a git installation
///
/// Every method except `clone_repo` operates inside `workdir`, a clone made
/// by `clone_repo`.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Clone `url` into the (empty) directory `dest`
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Check out a branch, creating it from the remote if needed
    async fn checkout(&self, workdir: &Path, reference: &str) -> Result<()>;

    /// Set the committer identity used for rewritten commits
    async fn configure_identity(&self, workdir: &Path, name: &str, email: &str) -> Result<()>;

    /// Register an additional remote
    async fn add_remote(&self, workdir: &Path, name: &str, url: &str) -> Result<()>;

    /// Rebase the current branch onto `onto`, applying `fixup!`/`squash!` commits
    async fn rebase(&self, workdir: &Path, onto: &str) -> Result<RebaseStatus>;

    /// Abandon an in-progress rebase
    async fn abort_rebase(&self, workdir: &Path) -> Result<()>;

    /// Force-push `reference` to the same branch name on `remote`
    async fn force_push(&self, workdir: &Path, remote: &str, reference: &str)
    -> Result<PushStatus>;
}
