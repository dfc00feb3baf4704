//! Merge planning - pure functions deciding the next step for one PR
//!
//! No I/O happens here. The resolver fetches a fresh [`PullRequest`], asks
//! [`plan_step`] what to do with it and performs the step.

use crate::policy::Policy;
use crate::types::{MergeMethod, MergeableState, PullRequest};

/// Number of times an `unknown` mergeable state is waited out before the
/// resolver falls back to bringing the branch up to date
pub const MAX_UNKNOWN_POLLS: u32 = 15;

/// The next thing to do with a PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStep {
    /// Hand the PR to the merge executor
    Merge,
    /// Merge an out-of-date PR as it is; a rejection leaves it open
    MergeBehind,
    /// Ask GitHub to merge the base branch into the head branch
    UpdateBranch,
    /// Rebase the head branch onto its base locally and force-push it
    Rebase,
    /// Treat the PR as conflicting
    CloseDirty,
    /// GitHub is still computing mergeability; fetch again later
    Wait,
    /// Leave the PR open without touching it
    Leave {
        /// Why nothing is done
        reason: String,
    },
    /// Mergeable state this bot does not handle
    Skip {
        /// The reported state
        state: String,
    },
}

impl std::fmt::Display for MergeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::MergeBehind => write!(f, "merge while behind"),
            Self::UpdateBranch => write!(f, "update branch"),
            Self::Rebase => write!(f, "rebase"),
            Self::CloseDirty => write!(f, "handle conflict"),
            Self::Wait => write!(f, "wait"),
            Self::Leave { reason } => write!(f, "leave open ({reason})"),
            Self::Skip { state } => write!(f, "skip (state '{state}')"),
        }
    }
}

/// Method to merge the PR with, or `None` if it cannot be merged as configured
///
/// A rebaseable PR is merged with the configured method. A PR that is only
/// mergeable gets a merge commit, either because that is the configured method
/// or because falling back to it is allowed.
pub fn merge_method_for(pr: &PullRequest, policy: &Policy) -> Option<MergeMethod> {
    if pr.rebaseable == Some(true) {
        return Some(policy.merge_method);
    }
    if pr.mergeable == Some(true)
        && (policy.merge_method == MergeMethod::Merge || policy.fallback_to_merge)
    {
        return Some(MergeMethod::Merge);
    }
    None
}

/// Method for a merge attempted while the PR is behind its base
///
/// GitHub may not have computed mergeability yet, so the configured method is
/// used whenever the eligibility check is inconclusive.
pub fn behind_merge_method(pr: &PullRequest, policy: &Policy) -> MergeMethod {
    merge_method_for(pr, policy).unwrap_or(policy.merge_method)
}

/// Decide what to do with a PR whose head is behind its base
///
/// Also used once an `unknown` state has been waited out. No outcome of this
/// step treats the PR as conflicting.
pub fn behind_step(pr: &PullRequest, policy: &Policy) -> MergeStep {
    if !policy.auto_update {
        return if policy.merge_when_behind {
            MergeStep::MergeBehind
        } else {
            MergeStep::Leave {
                reason: "behind base and updating is disabled".to_string(),
            }
        };
    }

    if policy.merge_method == MergeMethod::Merge {
        MergeStep::UpdateBranch
    } else if pr.is_same_repo() {
        MergeStep::Rebase
    } else {
        MergeStep::Leave {
            reason: "head branch lives in a fork and cannot be rebased".to_string(),
        }
    }
}

/// Decide the next step for a freshly fetched open PR
///
/// `polls` is the number of times this PR has already been waited on while
/// its mergeable state was `unknown`.
pub fn plan_step(pr: &PullRequest, policy: &Policy, polls: u32) -> MergeStep {
    match &pr.mergeable_state {
        MergeableState::Behind => behind_step(pr, policy),
        MergeableState::Clean => MergeStep::Merge,
        MergeableState::Unstable => {
            if merge_method_for(pr, policy).is_some() {
                MergeStep::Merge
            } else {
                MergeStep::CloseDirty
            }
        }
        MergeableState::Dirty => MergeStep::CloseDirty,
        MergeableState::Unknown if polls >= MAX_UNKNOWN_POLLS => behind_step(pr, policy),
        MergeableState::Unknown => MergeStep::Wait,
        MergeableState::Other(state) => MergeStep::Skip {
            state: state.clone(),
        },
    }
}
