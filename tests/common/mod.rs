//! Shared fixtures and test doubles

#![allow(dead_code)]

pub mod fake_git;
pub mod mock_platform;

pub use fake_git::{FakeGit, GitCall};
pub use mock_platform::{Call, MockPlatformService};

use pr_automerge::merge::{Backoff, SyncTarget};
use pr_automerge::policy::Policy;
use pr_automerge::types::{BranchRef, MergeableState, PlatformConfig, PrState, PullRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Config for a repository named `owner/repo` on github.com
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "owner".to_string(),
        repo: "repo".to_string(),
        api_url: "https://api.github.com".to_string(),
        server_url: "https://github.com".to_string(),
    }
}

/// Clone/push URLs that are never contacted
pub fn sync_target() -> SyncTarget {
    SyncTarget {
        clone_url: "https://x-access-token:t@github.com/owner/repo.git".to_string(),
        push_url: "https://x-access-token:t@github.com/owner/repo.git".to_string(),
    }
}

/// Open same-repo PR labelled `automerge` in the given state
pub fn make_pr(number: u64, state: MergeableState) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR {number}"),
        html_url: format!("https://github.com/owner/repo/pull/{number}"),
        state: PrState::Open,
        locked: false,
        labels: ["automerge".to_string()].into_iter().collect(),
        head: BranchRef {
            ref_name: format!("feature-{number}"),
            repo: Some("owner/repo".to_string()),
        },
        base: BranchRef {
            ref_name: "main".to_string(),
            repo: Some("owner/repo".to_string()),
        },
        mergeable: Some(true),
        rebaseable: Some(true),
        mergeable_state: state,
    }
}

/// Same PR with a different state
pub fn with_state(pr: &PullRequest, state: MergeableState) -> PullRequest {
    PullRequest {
        mergeable_state: state,
        ..pr.clone()
    }
}

/// Default policy adjusted in place
pub fn policy_with(adjust: impl FnOnce(&mut Policy)) -> Policy {
    let mut policy = Policy::default();
    adjust(&mut policy);
    policy
}

/// Zero-delay backoff that counts how often it was asked for a delay
#[derive(Clone, Default)]
pub struct CountingBackoff {
    sleeps: Arc<AtomicU32>,
}

impl CountingBackoff {
    pub fn sleeps(&self) -> u32 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Backoff for CountingBackoff {
    fn next_delay(&self) -> Duration {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        Duration::ZERO
    }
}
