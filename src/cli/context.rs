//! Shared setup for a run
//!
//! Turns raw command line settings into the platform service, git backend
//! and policy the library operates on.

use pr_automerge::auth::get_github_auth;
use pr_automerge::config::{PolicySettings, load_policy_file};
use pr_automerge::error::Result;
use pr_automerge::git::{GitBackend, GitCli};
use pr_automerge::merge::SyncTarget;
use pr_automerge::platform::{
    DryRunPlatform, GitHubService, PlatformService, authenticated_clone_url, parse_repo_info,
};
use pr_automerge::policy::Policy;
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings collected by clap
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    /// `owner/repo`
    pub repository: String,
    /// Token passed on the command line or via `GITHUB_TOKEN`
    pub token: Option<String>,
    /// REST API base
    pub api_url: String,
    /// Web base used for clone URLs
    pub server_url: String,
    /// Optional TOML policy file
    pub config_file: Option<PathBuf>,
    /// Policy values from flags or environment
    pub policy: PolicySettings,
    /// Log mutations instead of performing them
    pub dry_run: bool,
}

/// Everything a run needs, assembled once
pub struct RunContext {
    /// Platform service, wrapped in [`DryRunPlatform`] for dry runs
    pub platform: Box<dyn PlatformService>,
    /// Git backend for local rebases
    pub git: Box<dyn GitBackend>,
    /// Selection and merge policy
    pub policy: Policy,
    /// Clone and push URLs for local rebases
    pub sync_target: SyncTarget,
}

impl RunContext {
    /// Validate settings, resolve credentials and create the services
    ///
    /// Policy errors are reported before any credential lookup or network
    /// access.
    pub async fn new(settings: RunSettings) -> Result<Self> {
        let file = settings
            .config_file
            .as_deref()
            .map(load_policy_file)
            .transpose()?;
        let policy = settings.policy.into_policy(file)?;
        debug!(?policy, "policy assembled");

        let platform_config =
            parse_repo_info(&settings.repository, &settings.api_url, &settings.server_url)?;
        let auth = get_github_auth(settings.token.as_deref()).await?;
        debug!(source = ?auth.source, "resolved GitHub token");

        let push_url = authenticated_clone_url(&platform_config, &auth.token)?;
        let sync_target = SyncTarget {
            clone_url: push_url.clone(),
            push_url,
        };

        let service: Box<dyn PlatformService> =
            Box::new(GitHubService::new(&auth.token, platform_config)?);
        let (platform, git): (Box<dyn PlatformService>, Box<dyn GitBackend>) = if settings.dry_run
        {
            info!("dry run: no changes will be made");
            (
                Box::new(DryRunPlatform::new(service)),
                Box::new(GitCli::dry_run()),
            )
        } else {
            (service, Box::new(GitCli::new()))
        };

        Ok(Self {
            platform,
            git,
            policy,
            sync_target,
        })
    }
}
