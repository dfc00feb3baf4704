//! Bringing a head branch up to date by rebasing it locally

use crate::error::Result;
use crate::git::{GitBackend, PushStatus, RebaseSession, RebaseStatus};
use crate::types::PullRequest;
use std::path::Path;
use tracing::{info, warn};

/// Remote the rebased branch is pushed to
pub const PUSH_REMOTE: &str = "automerge";

/// Committer recorded on rewritten commits
pub const COMMITTER_NAME: &str = "github-actions[bot]";

/// Committer e-mail recorded on rewritten commits
pub const COMMITTER_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Where to fetch the repository from and where to push the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// URL the temporary clone is made from
    pub clone_url: String,
    /// Authenticated URL the rebased branch is force-pushed to
    pub push_url: String,
}

/// Outcome of a local rebase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Rebased and pushed
    Synced,
    /// The rebase hit a conflict and was aborted
    Conflict,
    /// The rebase succeeded but the push was refused
    PushRejected(String),
}

/// Rebase the PR's head branch onto its base branch and force-push it (EFFECTFUL)
///
/// Works in a temporary clone that is deleted before returning, whatever the
/// outcome.
pub async fn rebase_onto_base(
    pr: &PullRequest,
    git: &dyn GitBackend,
    target: &SyncTarget,
) -> Result<SyncResult> {
    let session = RebaseSession::open(git, &target.clone_url).await?;
    let result = rebase_in(session.path(), pr, git, target).await;
    if let Err(e) = session.close() {
        warn!(pr_number = pr.number, error = %e, "failed to remove rebase working directory");
    }
    result
}

async fn rebase_in(
    workdir: &Path,
    pr: &PullRequest,
    git: &dyn GitBackend,
    target: &SyncTarget,
) -> Result<SyncResult> {
    let base = &pr.base.ref_name;
    let head = &pr.head.ref_name;

    git.configure_identity(workdir, COMMITTER_NAME, COMMITTER_EMAIL)
        .await?;
    git.checkout(workdir, base).await?;
    git.checkout(workdir, head).await?;

    info!(pr_number = pr.number, %head, %base, "rebasing head onto base");
    if git.rebase(workdir, base).await? == RebaseStatus::Conflict {
        info!(pr_number = pr.number, "rebase hit a conflict, aborting");
        git.abort_rebase(workdir).await?;
        return Ok(SyncResult::Conflict);
    }

    git.add_remote(workdir, PUSH_REMOTE, &target.push_url).await?;
    match git.force_push(workdir, PUSH_REMOTE, head).await? {
        PushStatus::Pushed => {
            info!(pr_number = pr.number, %head, "pushed rebased branch");
            Ok(SyncResult::Synced)
        }
        PushStatus::Rejected(message) => {
            warn!(pr_number = pr.number, %head, %message, "push of rebased branch rejected");
            Ok(SyncResult::PushRejected(message))
        }
    }
}
