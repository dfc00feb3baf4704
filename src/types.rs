//! Core types for pr-automerge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// One side of a pull request: a branch and the repository that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Branch name (without `refs/heads/`)
    pub ref_name: String,
    /// Full name of the owning repository (`owner/repo`), if it still exists
    pub repo: Option<String>,
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Mergeability summary computed by GitHub
///
/// GitHub computes this in the background after every push to either branch.
/// `Unknown` means the computation has not finished yet and the PR has to be
/// fetched again later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// Still being computed
    Unknown,
    /// Head branch is out of date with its base
    Behind,
    /// Mergeable and all checks pass
    Clean,
    /// Mergeable but some non-required checks fail
    Unstable,
    /// Merge conflict
    Dirty,
    /// Any other value (`blocked`, `draft`, `has_hooks`, ...)
    Other(String),
}

impl MergeableState {
    /// Parse GitHub's wire representation
    pub fn from_api(value: &str) -> Self {
        match value {
            "unknown" => Self::Unknown,
            "behind" => Self::Behind,
            "clean" => Self::Clean,
            "unstable" => Self::Unstable,
            "dirty" => Self::Dirty,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Behind => write!(f, "behind"),
            Self::Clean => write!(f, "clean"),
            Self::Unstable => write!(f, "unstable"),
            Self::Dirty => write!(f, "dirty"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// A pull request as seen at one instant
///
/// The mergeability fields are only as fresh as the fetch that produced them;
/// callers re-fetch before acting on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL for the PR
    pub html_url: String,
    /// Current state of the PR
    pub state: PrState,
    /// Whether conversation on the PR is locked
    pub locked: bool,
    /// Label names
    pub labels: BTreeSet<String>,
    /// Head (source) branch
    pub head: BranchRef,
    /// Base (target) branch
    pub base: BranchRef,
    /// Whether GitHub can merge the PR without conflicts (`None` while computing)
    pub mergeable: Option<bool>,
    /// Whether the PR can be rebased onto its base (`None` while computing)
    pub rebaseable: Option<bool>,
    /// Mergeability summary
    pub mergeable_state: MergeableState,
}

impl PullRequest {
    /// Whether the PR is still open
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }

    /// Whether head and base live in the same repository
    ///
    /// A deleted fork reports no head repository and is never same-repo.
    pub fn is_same_repo(&self) -> bool {
        match (&self.head.repo, &self.base.repo) {
            (Some(head), Some(base)) => head == base,
            _ => false,
        }
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            other => Err(Error::Config(format!(
                "unknown merge method '{other}' (expected merge, squash or rebase)"
            ))),
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// What the platform said about a merge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The PR was merged
    Merged {
        /// SHA of the resulting commit
        sha: Option<String>,
    },
    /// Someone else merged it first
    AlreadyMerged,
    /// GitHub refused the merge although the PR looked mergeable when inspected
    NotMergeable {
        /// Message returned by GitHub
        message: String,
    },
}

/// Repository coordinates on a GitHub instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// REST API base, e.g. `https://api.github.com`
    pub api_url: String,
    /// Web base used for clone URLs, e.g. `https://github.com`
    pub server_url: String,
}

impl PlatformConfig {
    /// `owner/repo`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
