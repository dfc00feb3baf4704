//! Handling of conflicting PRs

use crate::error::Result;
use crate::platform::PlatformService;
use crate::policy::Policy;
use crate::types::PullRequest;
use tracing::{info, warn};

/// What happened to a conflicting PR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The PR was closed
    Closed {
        /// Whether its head branch was deleted as well
        branch_deleted: bool,
    },
    /// Closing is disabled; the PR stays open for a human
    LeftOpen,
}

/// Apply the conflict policy to a PR (EFFECTFUL)
///
/// A failed branch deletion is logged and reported as `branch_deleted: false`;
/// it never fails the call.
pub async fn close_dirty(
    pr: &PullRequest,
    policy: &Policy,
    platform: &dyn PlatformService,
) -> Result<CloseOutcome> {
    if !policy.close_on_conflict {
        info!(pr_number = pr.number, "PR has conflicts, leaving it open");
        return Ok(CloseOutcome::LeftOpen);
    }

    info!(pr_number = pr.number, "PR has conflicts, closing it");
    platform.close_pr(pr.number).await?;

    if !policy.delete_branch_on_close {
        return Ok(CloseOutcome::Closed {
            branch_deleted: false,
        });
    }

    // Only branches in this repository are ours to delete
    if !pr.is_same_repo() {
        warn!(
            pr_number = pr.number,
            branch = %pr.head.ref_name,
            "head branch lives in a fork, not deleting it"
        );
        return Ok(CloseOutcome::Closed {
            branch_deleted: false,
        });
    }

    let branch_deleted = match platform.delete_branch(&pr.head.ref_name).await {
        Ok(()) => {
            info!(pr_number = pr.number, branch = %pr.head.ref_name, "deleted head branch");
            true
        }
        Err(e) => {
            warn!(
                pr_number = pr.number,
                branch = %pr.head.ref_name,
                error = %e,
                "failed to delete head branch"
            );
            false
        }
    };

    Ok(CloseOutcome::Closed { branch_deleted })
}
