//! Merge policy and pull request selection
//!
//! A [`Policy`] is assembled once per run and passed by reference to every
//! component. Selection is a pure predicate over a fetched pull request.

use crate::error::{Error, Result};
use crate::types::{MergeMethod, PullRequest};
use std::collections::BTreeSet;

/// Split a comma-separated label list, trimming entries and dropping empty ones
pub fn parse_label_list(labels: &str) -> BTreeSet<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect()
}

/// Decision parameters for one run
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Policy {
    allow_labels: BTreeSet<String>,
    block_labels: BTreeSet<String>,
    /// Also merge PRs whose head lives in a fork
    pub merge_forks: bool,
    /// Bring branches that are behind their base up to date
    pub auto_update: bool,
    /// Merge a behind branch directly when `auto_update` is off
    pub merge_when_behind: bool,
    /// Close PRs that have merge conflicts
    pub close_on_conflict: bool,
    /// Delete the head branch after closing a conflicting PR
    pub delete_branch_on_close: bool,
    /// Merge with a merge commit when the configured method cannot be applied
    pub fallback_to_merge: bool,
    /// Method used for merging
    pub merge_method: MergeMethod,
}

impl Policy {
    /// Create a policy with the given label sets and default flags
    ///
    /// Fails if a label is both required and blocking.
    pub fn new(allow_labels: BTreeSet<String>, block_labels: BTreeSet<String>) -> Result<Self> {
        let overlap: Vec<&str> = allow_labels
            .intersection(&block_labels)
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(Error::Config(format!(
                "labels [{}] are both allowed and blocked",
                overlap.join(", ")
            )));
        }

        Ok(Self {
            allow_labels,
            block_labels,
            merge_forks: false,
            auto_update: true,
            merge_when_behind: true,
            close_on_conflict: false,
            delete_branch_on_close: false,
            fallback_to_merge: false,
            merge_method: MergeMethod::Merge,
        })
    }

    /// Labels a PR must carry (all of them)
    pub const fn allow_labels(&self) -> &BTreeSet<String> {
        &self.allow_labels
    }

    /// Labels a PR must not carry (any of them)
    pub const fn block_labels(&self) -> &BTreeSet<String> {
        &self.block_labels
    }

    /// Whether the PR is eligible for automatic handling
    pub fn allows(&self, pr: &PullRequest) -> bool {
        self.allow_labels.is_subset(&pr.labels)
            && self.block_labels.is_disjoint(&pr.labels)
            && !pr.locked
            && (self.merge_forks || pr.is_same_repo())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allow_labels: BTreeSet::from(["automerge".to_string()]),
            block_labels: BTreeSet::new(),
            merge_forks: false,
            auto_update: true,
            merge_when_behind: true,
            close_on_conflict: false,
            delete_branch_on_close: false,
            fallback_to_merge: false,
            merge_method: MergeMethod::Merge,
        }
    }
}

/// Keep the PRs the policy allows, preserving platform order
pub fn select_pull_requests(prs: Vec<PullRequest>, policy: &Policy) -> Vec<PullRequest> {
    prs.into_iter().filter(|pr| policy.allows(pr)).collect()
}
