//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    BranchRef, MergeMethod, MergeOutcome, MergeableState, PlatformConfig, PrState, PullRequest,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (branch deletion)
    token: String,
    /// HTTP client for raw requests (branch deletion)
    http_client: Client,
}

impl GitHubService {
    /// Create a new GitHub service for the configured repository
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(config.api_url.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("pr-automerge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
        })
    }
}

fn mergeable_state_from_octocrab(
    state: Option<&octocrab::models::pulls::MergeableState>,
) -> MergeableState {
    use octocrab::models::pulls::MergeableState as Api;

    match state {
        None | Some(Api::Unknown) => MergeableState::Unknown,
        Some(Api::Behind) => MergeableState::Behind,
        Some(Api::Clean) => MergeableState::Clean,
        Some(Api::Unstable) => MergeableState::Unstable,
        Some(Api::Dirty) => MergeableState::Dirty,
        Some(Api::Blocked) => MergeableState::Other("blocked".to_string()),
        Some(Api::Draft) => MergeableState::Other("draft".to_string()),
        Some(Api::HasHooks) => MergeableState::Other("has_hooks".to_string()),
        // MergeableState is non-exhaustive
        Some(other) => MergeableState::Other(format!("{other:?}").to_lowercase()),
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    PullRequest {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        state,
        locked: pr.locked,
        labels: pr
            .labels
            .as_ref()
            .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default(),
        head: BranchRef {
            ref_name: pr.head.ref_field.clone(),
            repo: pr.head.repo.as_ref().and_then(|r| r.full_name.clone()),
        },
        base: BranchRef {
            ref_name: pr.base.ref_field.clone(),
            repo: pr.base.repo.as_ref().and_then(|r| r.full_name.clone()),
        },
        mergeable: pr.mergeable,
        rebaseable: pr.rebaseable,
        mergeable_state: mergeable_state_from_octocrab(pr.mergeable_state.as_ref()),
    }
}

/// Path of a branch ref below `git/refs/`, with each segment escaped
fn branch_ref_path(branch: &str) -> String {
    let segments: Vec<_> = branch.split('/').map(urlencoding::encode).collect();
    format!("heads/{}", segments.join("/"))
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        debug!(repo = %self.config.slug(), "listing open PRs");
        let first_page = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await?;

        let prs = self.client.all_pages(first_page).await?;
        let result: Vec<PullRequest> = prs.iter().map(pr_from_octocrab).collect();
        debug!(count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        debug!(pr_number, "getting PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(
            pr_number,
            state = %result.state,
            mergeable_state = %result.mergeable_state,
            mergeable = ?result.mergeable,
            rebaseable = ?result.rebaseable,
            "got PR"
        );
        Ok(result)
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        title: &str,
        method: MergeMethod,
    ) -> Result<MergeOutcome> {
        debug!(pr_number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(pr_number)
            .method(octocrab_method)
            .title(title.to_string())
            .send()
            .await;

        let outcome = match result {
            Ok(merge) if merge.merged => MergeOutcome::Merged { sha: merge.sha },
            Ok(merge) => MergeOutcome::NotMergeable {
                message: merge.message.unwrap_or_default(),
            },
            // 405: not mergeable, 409: head moved since it was inspected
            Err(octocrab::Error::GitHub { source, .. })
                if matches!(source.status_code.as_u16(), 405 | 409) =>
            {
                if source.message.to_lowercase().contains("already merged") {
                    MergeOutcome::AlreadyMerged
                } else {
                    MergeOutcome::NotMergeable {
                        message: source.message.clone(),
                    }
                }
            }
            Err(e) => return Err(Error::GitHubApi(format!("Merge failed: {e}"))),
        };

        debug!(pr_number, outcome = ?outcome, "merge request answered");
        Ok(outcome)
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        debug!(pr_number, "closing PR");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .update(pr_number)
            .state(octocrab::models::IssueState::Closed)
            .send()
            .await?;
        debug!(pr_number, "closed PR");
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting branch");
        let url = format!(
            "{}/repos/{}/{}/git/refs/{}",
            self.config.api_url,
            self.config.owner,
            self.config.repo,
            branch_ref_path(branch)
        );

        let response = self
            .http_client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to delete branch: {e}")))?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => {
                debug!(branch, "deleted branch");
                Ok(())
            }
            status => Err(Error::GitHubApi(format!(
                "Deleting branch '{branch}' returned {status}"
            ))),
        }
    }

    async fn update_branch(&self, pr_number: u64) -> Result<()> {
        debug!(pr_number, "requesting branch update");
        let accepted = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .update_branch(pr_number)
            .await?;
        debug!(pr_number, accepted, "requested branch update");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_ref_path_escapes_segments() {
        assert_eq!(branch_ref_path("main"), "heads/main");
        assert_eq!(branch_ref_path("feature/a b"), "heads/feature/a%20b");
    }

    #[test]
    fn test_missing_mergeable_state_is_unknown() {
        assert_eq!(mergeable_state_from_octocrab(None), MergeableState::Unknown);
    }
}
