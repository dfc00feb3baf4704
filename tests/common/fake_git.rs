//! Fake git backend for testing
//!
//! Records calls, remembers the working directory it was cloned into and
//! returns scripted rebase/push results.

use async_trait::async_trait;
use pr_automerge::error::{Error, Result};
use pr_automerge::git::{GitBackend, PushStatus, RebaseStatus};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded git call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone(String),
    Checkout(String),
    ConfigureIdentity,
    AddRemote { name: String, url: String },
    Rebase(String),
    AbortRebase,
    ForcePush { remote: String, reference: String },
}

pub struct FakeGit {
    rebase_status: RebaseStatus,
    push_status: PushStatus,
    failing_checkout: Option<String>,
    calls: Mutex<Vec<GitCall>>,
    workdir: Mutex<Option<PathBuf>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self {
            rebase_status: RebaseStatus::Clean,
            push_status: PushStatus::Pushed,
            failing_checkout: None,
            calls: Mutex::new(Vec::new()),
            workdir: Mutex::new(None),
        }
    }

    pub fn with_conflict() -> Self {
        Self {
            rebase_status: RebaseStatus::Conflict,
            ..Self::new()
        }
    }

    pub fn with_push_rejected(msg: &str) -> Self {
        Self {
            push_status: PushStatus::Rejected(msg.to_string()),
            ..Self::new()
        }
    }

    /// `checkout` of `reference` fails with a git error
    pub fn with_checkout_failure(reference: &str) -> Self {
        Self {
            failing_checkout: Some(reference.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Directory the last clone was made into
    pub fn workdir(&self) -> Option<PathBuf> {
        self.workdir.lock().unwrap().clone()
    }

    fn record(&self, call: GitCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitBackend for FakeGit {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.record(GitCall::Clone(url.to_string()));
        std::fs::write(dest.join("README.md"), "cloned")?;
        *self.workdir.lock().unwrap() = Some(dest.to_path_buf());
        Ok(())
    }

    async fn checkout(&self, _workdir: &Path, reference: &str) -> Result<()> {
        self.record(GitCall::Checkout(reference.to_string()));
        if self.failing_checkout.as_deref() == Some(reference) {
            return Err(Error::Git(format!(
                "git checkout failed: pathspec '{reference}' did not match"
            )));
        }
        Ok(())
    }

    async fn configure_identity(&self, _workdir: &Path, _name: &str, _email: &str) -> Result<()> {
        self.record(GitCall::ConfigureIdentity);
        Ok(())
    }

    async fn add_remote(&self, _workdir: &Path, name: &str, url: &str) -> Result<()> {
        self.record(GitCall::AddRemote {
            name: name.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    async fn rebase(&self, _workdir: &Path, onto: &str) -> Result<RebaseStatus> {
        self.record(GitCall::Rebase(onto.to_string()));
        Ok(self.rebase_status)
    }

    async fn abort_rebase(&self, _workdir: &Path) -> Result<()> {
        self.record(GitCall::AbortRebase);
        Ok(())
    }

    async fn force_push(
        &self,
        _workdir: &Path,
        remote: &str,
        reference: &str,
    ) -> Result<PushStatus> {
        self.record(GitCall::ForcePush {
            remote: remote.to_string(),
            reference: reference.to_string(),
        });
        Ok(self.push_status.clone())
    }
}
