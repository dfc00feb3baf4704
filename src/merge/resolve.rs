//! Per-PR readiness state machine
//!
//! [`Resolver::process`] repeatedly fetches a PR, plans one step from its
//! fresh state and performs it. Waiting on an `unknown` mergeable state is
//! bounded by [`MAX_UNKNOWN_POLLS`]; a merge rejected because the PR changed
//! underneath restarts the cycle, bounded by [`MAX_MERGE_RACES`].

use crate::error::{Error, Result};
use crate::git::GitBackend;
use crate::merge::close::{CloseOutcome, close_dirty};
use crate::merge::execute::{MergeAttempt, execute_behind_merge, execute_merge};
use crate::merge::plan::{MAX_UNKNOWN_POLLS, MergeStep, plan_step};
use crate::merge::sync::{SyncResult, SyncTarget, rebase_onto_base};
use crate::platform::PlatformService;
use crate::policy::Policy;
use crate::types::{MergeMethod, PrState, PullRequest};
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Re-evaluations after a rejected merge tolerated for one PR before giving up
pub const MAX_MERGE_RACES: u32 = 5;

/// Source of the delay between two fetches of a PR in `unknown` state
pub trait Backoff: Send + Sync {
    /// Delay before the next fetch
    fn next_delay(&self) -> Duration;
}

/// Uniformly random delay within an inclusive range
#[derive(Debug, Clone, Copy)]
pub struct RandomBackoff {
    min: Duration,
    max: Duration,
}

impl RandomBackoff {
    /// Delays between `min` and `max` (swapped if given in the wrong order)
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl Default for RandomBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(10))
    }
}

impl Backoff for RandomBackoff {
    fn next_delay(&self) -> Duration {
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Always returns a zero delay
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Backoff for NoDelay {
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Final decision for one PR in this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// The PR was closed, merged or locked before anything was done
    AlreadyResolved {
        /// State at the time of the check
        state: PrState,
        /// Whether it was locked
        locked: bool,
    },
    /// The PR was merged
    Merged {
        /// Method used
        method: MergeMethod,
        /// Resulting commit
        sha: Option<String>,
    },
    /// Someone else merged it while it was being processed
    AlreadyMerged,
    /// GitHub was asked to update the head branch
    BranchUpdated,
    /// The head branch was rebased locally and force-pushed
    Rebased,
    /// Rebased cleanly but the push was refused
    SyncRejected {
        /// Push error output
        message: String,
    },
    /// The PR was closed because of conflicts
    Closed {
        /// Whether its head branch was deleted
        branch_deleted: bool,
    },
    /// Nothing was done
    LeftOpen {
        /// Why
        reason: String,
    },
    /// Mergeable state not handled by this bot
    Skipped {
        /// The reported state
        state: String,
    },
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyResolved { state, locked } => {
                if *locked {
                    write!(f, "locked, skipped")
                } else {
                    write!(f, "already {state}")
                }
            }
            Self::Merged { method, sha } => match sha {
                Some(sha) => write!(f, "merged ({method}) as {sha}"),
                None => write!(f, "merged ({method})"),
            },
            Self::AlreadyMerged => write!(f, "already merged"),
            Self::BranchUpdated => write!(f, "branch update requested"),
            Self::Rebased => write!(f, "rebased onto base"),
            Self::SyncRejected { message } => write!(f, "rebased but push rejected: {message}"),
            Self::Closed { branch_deleted } => {
                if *branch_deleted {
                    write!(f, "closed, branch deleted")
                } else {
                    write!(f, "closed")
                }
            }
            Self::LeftOpen { reason } => write!(f, "left open: {reason}"),
            Self::Skipped { state } => write!(f, "skipped (mergeable state '{state}')"),
        }
    }
}

/// Drives single PRs to a [`Resolution`]
pub struct Resolver<'a> {
    platform: &'a dyn PlatformService,
    git: &'a dyn GitBackend,
    policy: &'a Policy,
    sync_target: SyncTarget,
    backoff: Box<dyn Backoff>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with the default randomized backoff
    pub fn new(
        platform: &'a dyn PlatformService,
        git: &'a dyn GitBackend,
        policy: &'a Policy,
        sync_target: SyncTarget,
    ) -> Self {
        Self {
            platform,
            git,
            policy,
            sync_target,
            backoff: Box::new(RandomBackoff::default()),
        }
    }

    /// Replace the delay used while waiting on an `unknown` state
    #[must_use]
    pub fn with_backoff(mut self, backoff: impl Backoff + 'static) -> Self {
        self.backoff = Box::new(backoff);
        self
    }

    /// Resolve one PR (EFFECTFUL)
    ///
    /// The PR is always fetched again first; a closed or locked PR is left
    /// untouched.
    pub async fn process(&self, pr_number: u64) -> Result<Resolution> {
        let mut polls = 0;
        let mut races = 0;

        loop {
            let pr = self.platform.get_pr(pr_number).await?;
            if pr.locked || !pr.is_open() {
                info!(pr_number, state = %pr.state, locked = pr.locked, "nothing to do");
                return Ok(Resolution::AlreadyResolved {
                    state: pr.state,
                    locked: pr.locked,
                });
            }

            let step = plan_step(&pr, self.policy, polls);
            info!(
                pr_number,
                mergeable_state = %pr.mergeable_state,
                %step,
                "planned step"
            );

            let resolution = match step {
                MergeStep::Wait => {
                    polls += 1;
                    let delay = self.backoff.next_delay();
                    debug!(
                        pr_number,
                        poll = polls,
                        max_polls = MAX_UNKNOWN_POLLS,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "mergeable state unknown, waiting"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                MergeStep::Merge => {
                    match execute_merge(&pr, self.policy, self.platform).await? {
                        MergeAttempt::Merged { method, sha } => Resolution::Merged { method, sha },
                        MergeAttempt::AlreadyMerged => Resolution::AlreadyMerged,
                        MergeAttempt::Ineligible => self.handle_conflict(&pr).await?,
                        MergeAttempt::Raced { .. } => {
                            races += 1;
                            if races > MAX_MERGE_RACES {
                                return Err(Error::MergeContention {
                                    number: pr_number,
                                    attempts: races,
                                });
                            }
                            info!(pr_number, attempt = races, "re-evaluating PR");
                            polls = 0;
                            continue;
                        }
                    }
                }
                MergeStep::MergeBehind => {
                    match execute_behind_merge(&pr, self.policy, self.platform).await? {
                        MergeAttempt::Merged { method, sha } => Resolution::Merged { method, sha },
                        MergeAttempt::AlreadyMerged => Resolution::AlreadyMerged,
                        MergeAttempt::Raced { message } => Resolution::LeftOpen {
                            reason: format!("merge of out-of-date branch rejected: {message}"),
                        },
                        MergeAttempt::Ineligible => Resolution::LeftOpen {
                            reason: "out-of-date branch cannot be merged".to_string(),
                        },
                    }
                }
                MergeStep::UpdateBranch => {
                    info!(pr_number, "requesting branch update");
                    self.platform.update_branch(pr_number).await?;
                    Resolution::BranchUpdated
                }
                MergeStep::Rebase => {
                    match rebase_onto_base(&pr, self.git, &self.sync_target).await? {
                        SyncResult::Synced => Resolution::Rebased,
                        SyncResult::Conflict => self.handle_conflict(&pr).await?,
                        SyncResult::PushRejected(message) => Resolution::SyncRejected { message },
                    }
                }
                MergeStep::CloseDirty => self.handle_conflict(&pr).await?,
                MergeStep::Leave { reason } => Resolution::LeftOpen { reason },
                MergeStep::Skip { state } => {
                    warn!(pr_number, %state, "unrecognized mergeable state, skipping");
                    Resolution::Skipped { state }
                }
            };

            info!(pr_number, %resolution, "resolved");
            return Ok(resolution);
        }
    }

    async fn handle_conflict(&self, pr: &PullRequest) -> Result<Resolution> {
        let resolution = match close_dirty(pr, self.policy, self.platform).await? {
            CloseOutcome::Closed { branch_deleted } => Resolution::Closed { branch_deleted },
            CloseOutcome::LeftOpen => Resolution::LeftOpen {
                reason: "conflicts with base and closing is disabled".to_string(),
            },
        };
        Ok(resolution)
    }
}
