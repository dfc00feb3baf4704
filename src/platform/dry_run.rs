//! Read-only platform decorator for previewing a run

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeOutcome, PlatformConfig, PullRequest};
use async_trait::async_trait;
use tracing::info;

/// Forwards reads to the wrapped service and logs mutations instead of sending them
///
/// Merges are reported as successful so the rest of the decision path runs
/// as it would for real.
pub struct DryRunPlatform {
    inner: Box<dyn PlatformService>,
}

impl DryRunPlatform {
    /// Wrap a platform service
    pub fn new(inner: Box<dyn PlatformService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl PlatformService for DryRunPlatform {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        self.inner.list_open_prs().await
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        self.inner.get_pr(pr_number).await
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        title: &str,
        method: MergeMethod,
    ) -> Result<MergeOutcome> {
        info!(pr_number, title, %method, "dry run: would merge PR");
        Ok(MergeOutcome::Merged { sha: None })
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        info!(pr_number, "dry run: would close PR");
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        info!(branch, "dry run: would delete branch");
        Ok(())
    }

    async fn update_branch(&self, pr_number: u64) -> Result<()> {
        info!(pr_number, "dry run: would request branch update");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        self.inner.config()
    }
}
