//! Merge engine for a single pull request
//!
//! Split like the rest of the crate into pure and effectful halves:
//! 1. Plan - decide the next step from a fresh PR (`plan`, pure, testable)
//! 2. Execute - merge, sync or close (`execute`, `sync`, `close`)
//! 3. Resolve - loop fetch/plan/execute until the PR reaches a decision (`resolve`)

mod close;
mod execute;
mod plan;
mod resolve;
mod sync;

pub use close::{CloseOutcome, close_dirty};
pub use execute::{MergeAttempt, execute_behind_merge, execute_merge};
pub use plan::{
    MAX_UNKNOWN_POLLS, MergeStep, behind_merge_method, behind_step, merge_method_for, plan_step,
};
pub use resolve::{
    Backoff, MAX_MERGE_RACES, NoDelay, RandomBackoff, Resolution, Resolver,
};
pub use sync::{
    COMMITTER_EMAIL, COMMITTER_NAME, PUSH_REMOTE, SyncResult, SyncTarget, rebase_onto_base,
};
