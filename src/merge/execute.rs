//! Merge execution - effectful operations
//!
//! Issues the merge call for a PR that the plan routed here and classifies
//! the platform's answer.

use crate::error::Result;
use crate::merge::plan::{behind_merge_method, merge_method_for};
use crate::platform::PlatformService;
use crate::policy::Policy;
use crate::types::{MergeMethod, MergeOutcome, PullRequest};
use tracing::{info, warn};

/// Result of one merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAttempt {
    /// The PR was merged
    Merged {
        /// Method that was used
        method: MergeMethod,
        /// SHA of the resulting commit
        sha: Option<String>,
    },
    /// Someone merged the PR first
    AlreadyMerged,
    /// GitHub rejected the merge although the PR looked mergeable; the PR
    /// must be fetched and evaluated again
    Raced {
        /// Message returned by GitHub
        message: String,
    },
    /// The PR cannot be merged with the configured method
    Ineligible,
}

/// Merge a PR if the policy allows it (EFFECTFUL)
///
/// No platform call is made for an ineligible PR.
pub async fn execute_merge(
    pr: &PullRequest,
    policy: &Policy,
    platform: &dyn PlatformService,
) -> Result<MergeAttempt> {
    let Some(method) = merge_method_for(pr, policy) else {
        info!(
            pr_number = pr.number,
            mergeable = ?pr.mergeable,
            rebaseable = ?pr.rebaseable,
            configured = %policy.merge_method,
            "PR cannot be merged with the configured method"
        );
        return Ok(MergeAttempt::Ineligible);
    };

    send_merge(pr, method, platform).await
}

/// Merge a PR that is behind its base without checking eligibility (EFFECTFUL)
///
/// Mergeability may still be uncomputed here, so the merge is simply
/// attempted. Never returns [`MergeAttempt::Ineligible`].
pub async fn execute_behind_merge(
    pr: &PullRequest,
    policy: &Policy,
    platform: &dyn PlatformService,
) -> Result<MergeAttempt> {
    let method = behind_merge_method(pr, policy);
    send_merge(pr, method, platform).await
}

async fn send_merge(
    pr: &PullRequest,
    method: MergeMethod,
    platform: &dyn PlatformService,
) -> Result<MergeAttempt> {
    info!(pr_number = pr.number, %method, title = %pr.title, "merging PR");
    let attempt = match platform.merge_pr(pr.number, &pr.title, method).await? {
        MergeOutcome::Merged { sha } => {
            info!(pr_number = pr.number, sha = sha.as_deref().unwrap_or("(no sha)"), "merged");
            MergeAttempt::Merged { method, sha }
        }
        MergeOutcome::AlreadyMerged => {
            info!(pr_number = pr.number, "PR was already merged");
            MergeAttempt::AlreadyMerged
        }
        MergeOutcome::NotMergeable { message } => {
            warn!(pr_number = pr.number, %message, "merge rejected by GitHub");
            MergeAttempt::Raced { message }
        }
    };
    Ok(attempt)
}
