//! Run driver: list, select and resolve open pull requests one at a time

use crate::error::Result;
use crate::merge::{Resolution, Resolver};
use crate::platform::PlatformService;
use crate::policy::{Policy, select_pull_requests};
use serde::Serialize;
use tracing::{error, info};

/// What happened to one selected PR
#[derive(Debug, Clone, Serialize)]
pub struct PrReport {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Decision, if the PR was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Error message, if processing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one run over a repository
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Open PRs found
    pub open: usize,
    /// PRs that passed the selection filter
    pub selected: usize,
    /// One report per selected PR, in processing order
    pub reports: Vec<PrReport>,
}

impl RunSummary {
    /// Number of PRs that failed with an error
    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.error.is_some()).count()
    }

    /// Number of PRs merged in this run
    pub fn merged(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.resolution, Some(Resolution::Merged { .. })))
            .count()
    }
}

/// Process every eligible open PR sequentially (EFFECTFUL)
///
/// Failing to list PRs aborts the run. A failure while processing one PR is
/// recorded in its report and the run moves on to the next PR.
pub async fn run(
    platform: &dyn PlatformService,
    resolver: &Resolver<'_>,
    policy: &Policy,
) -> Result<RunSummary> {
    let open_prs = platform.list_open_prs().await?;
    let mut summary = RunSummary {
        open: open_prs.len(),
        ..RunSummary::default()
    };

    if open_prs.is_empty() {
        info!(repo = %platform.config().slug(), "no open pull requests");
        return Ok(summary);
    }

    let selected = select_pull_requests(open_prs, policy);
    summary.selected = selected.len();
    info!(
        open = summary.open,
        selected = summary.selected,
        "selected pull requests"
    );

    for pr in selected {
        let report = match resolver.process(pr.number).await {
            Ok(resolution) => PrReport {
                number: pr.number,
                title: pr.title,
                resolution: Some(resolution),
                error: None,
            },
            Err(e) => {
                error!(pr_number = pr.number, error = %e, "failed to process PR");
                PrReport {
                    number: pr.number,
                    title: pr.title,
                    resolution: None,
                    error: Some(e.to_string()),
                }
            }
        };
        summary.reports.push(report);
    }

    Ok(summary)
}
