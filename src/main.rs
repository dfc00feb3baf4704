//! automerge - merge labelled pull requests once GitHub says they are ready
//!
//! CLI binary, typically run from a CI job on every push and PR event.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pr_automerge::config::PolicySettings;
use pr_automerge::platform::{DEFAULT_API_URL, DEFAULT_SERVER_URL};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

#[derive(Parser)]
#[command(name = "automerge")]
#[command(about = "Merge, update or close labelled GitHub pull requests")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Repository as owner/repo
    #[arg(long, global = true, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// GitHub token (falls back to GH_TOKEN, then `gh auth token`)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// GitHub web base URL, used for clone URLs
    #[arg(long, global = true, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// TOML file with policy settings
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Comma-separated labels a PR must carry [default: automerge]
    #[arg(long, global = true, env = "MERGE_LABELS")]
    allow_labels: Option<String>,

    /// Comma-separated labels that exclude a PR
    #[arg(long, global = true, env = "BLOCK_LABELS")]
    block_labels: Option<String>,

    /// Merge PRs opened from forks [default: false]
    #[arg(long, global = true, env = "MERGE_FORKS", value_name = "BOOL")]
    merge_forks: Option<String>,

    /// Bring branches that are behind up to date [default: true]
    #[arg(long, global = true, env = "AUTO_UPDATE", value_name = "BOOL")]
    auto_update: Option<String>,

    /// Merge branches that are behind when not updating them [default: true]
    #[arg(long, global = true, env = "MERGE_WHEN_BEHIND", value_name = "BOOL")]
    merge_when_behind: Option<String>,

    /// Close PRs that conflict with their base [default: false]
    #[arg(long, global = true, env = "CLOSE_ON_CONFLICT", value_name = "BOOL")]
    close_on_conflict: Option<String>,

    /// Delete the head branch of PRs closed for conflicts [default: false]
    #[arg(long, global = true, env = "DELETE_BRANCH_ON_CLOSE", value_name = "BOOL")]
    delete_branch_on_close: Option<String>,

    /// Use a merge commit when a rebase merge is not possible [default: false]
    #[arg(long, global = true, env = "FALLBACK_TO_MERGE", value_name = "BOOL")]
    fallback_to_merge: Option<String>,

    /// merge, squash or rebase [default: merge]
    #[arg(long, global = true, env = "MERGE_METHOD")]
    merge_method: Option<String>,

    /// Log mutations instead of performing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (overridden by AUTOMERGE_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every labelled open pull request once (default)
    Run,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("AUTOMERGE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pr_automerge={default_level},automerge={default_level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let repository = cli.repository.ok_or_else(|| {
                anyhow::anyhow!("No repository given. Set GITHUB_REPOSITORY or pass --repository")
            })?;
            let settings = cli::RunSettings {
                repository,
                token: cli.token,
                api_url: cli.api_url,
                server_url: cli.server_url,
                config_file: cli.config_file,
                policy: PolicySettings {
                    allow_labels: cli.allow_labels,
                    block_labels: cli.block_labels,
                    merge_forks: cli.merge_forks,
                    auto_update: cli.auto_update,
                    merge_when_behind: cli.merge_when_behind,
                    close_on_conflict: cli.close_on_conflict,
                    delete_branch_on_close: cli.delete_branch_on_close,
                    fallback_to_merge: cli.fallback_to_merge,
                    merge_method: cli.merge_method,
                },
                dry_run: cli.dry_run,
            };
            cli::run_automerge(settings, cli::RunOptions { json: cli.json }).await?;
        }
    }

    Ok(())
}
