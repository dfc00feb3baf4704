//! Mock platform service for testing
//!
//! Responses are scripted per PR as a queue; the last entry is repeated once
//! the queue is drained. Every call is recorded in order. Clones share state,
//! so a clone can be handed to a decorator and inspected afterwards.

use async_trait::async_trait;
use pr_automerge::error::{Error, Result};
use pr_automerge::platform::PlatformService;
use pr_automerge::types::{MergeMethod, MergeOutcome, PlatformConfig, PullRequest};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListOpenPrs,
    GetPr(u64),
    Merge {
        pr_number: u64,
        title: String,
        method: MergeMethod,
    },
    Close(u64),
    DeleteBranch(String),
    UpdateBranch(u64),
}

impl Call {
    /// Whether the call changes anything on the platform
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListOpenPrs | Self::GetPr(_))
    }
}

#[derive(Default)]
struct MockState {
    open_prs: Vec<PullRequest>,
    pr_responses: HashMap<u64, VecDeque<PullRequest>>,
    merge_responses: HashMap<u64, VecDeque<MergeOutcome>>,
    calls: Vec<Call>,
    error_on_list: Option<String>,
    error_on_get_pr: HashSet<u64>,
    error_on_delete_branch: Option<String>,
}

/// Scriptable, call-recording [`PlatformService`]
#[derive(Clone)]
pub struct MockPlatformService {
    config: PlatformConfig,
    state: Arc<Mutex<MockState>>,
}

fn next_scripted<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl MockPlatformService {
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn new() -> Self {
        Self::with_config(crate::common::github_config())
    }

    // === Scripting ===

    /// PRs returned by `list_open_prs`
    pub fn set_open_prs(&self, prs: Vec<PullRequest>) {
        self.state.lock().unwrap().open_prs = prs;
    }

    /// Successive `get_pr` responses for one PR
    pub fn set_pr_sequence(&self, pr_number: u64, prs: Vec<PullRequest>) {
        self.state
            .lock()
            .unwrap()
            .pr_responses
            .insert(pr_number, prs.into());
    }

    /// Fixed `get_pr` response for one PR
    pub fn set_pr(&self, pr: PullRequest) {
        self.set_pr_sequence(pr.number, vec![pr]);
    }

    /// Successive `merge_pr` responses for one PR
    pub fn set_merge_sequence(&self, pr_number: u64, outcomes: Vec<MergeOutcome>) {
        self.state
            .lock()
            .unwrap()
            .merge_responses
            .insert(pr_number, outcomes.into());
    }

    // === Error injection ===

    pub fn fail_list(&self, msg: &str) {
        self.state.lock().unwrap().error_on_list = Some(msg.to_string());
    }

    pub fn fail_get_pr(&self, pr_number: u64) {
        self.state.lock().unwrap().error_on_get_pr.insert(pr_number);
    }

    pub fn fail_delete_branch(&self, msg: &str) {
        self.state.lock().unwrap().error_on_delete_branch = Some(msg.to_string());
    }

    // === Inspection ===

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn get_pr_count(&self, pr_number: u64) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::GetPr(pr_number))
            .count()
    }

    pub fn merge_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Merge { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        self.record(Call::ListOpenPrs);
        let state = self.state.lock().unwrap();
        if let Some(msg) = &state.error_on_list {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(state.open_prs.clone())
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        self.record(Call::GetPr(pr_number));
        let mut state = self.state.lock().unwrap();
        if state.error_on_get_pr.contains(&pr_number) {
            return Err(Error::Platform(format!("PR #{pr_number} unavailable")));
        }
        state
            .pr_responses
            .get_mut(&pr_number)
            .and_then(next_scripted)
            .ok_or_else(|| Error::Platform(format!("PR #{pr_number} not scripted")))
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        title: &str,
        method: MergeMethod,
    ) -> Result<MergeOutcome> {
        self.record(Call::Merge {
            pr_number,
            title: title.to_string(),
            method,
        });
        let mut state = self.state.lock().unwrap();
        Ok(state
            .merge_responses
            .get_mut(&pr_number)
            .and_then(next_scripted)
            .unwrap_or(MergeOutcome::Merged {
                sha: Some(format!("sha{pr_number}")),
            }))
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        self.record(Call::Close(pr_number));
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.record(Call::DeleteBranch(branch.to_string()));
        match &self.state.lock().unwrap().error_on_delete_branch {
            Some(msg) => Err(Error::GitHubApi(msg.clone())),
            None => Ok(()),
        }
    }

    async fn update_branch(&self, pr_number: u64) -> Result<()> {
        self.record(Call::UpdateBranch(pr_number));
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
