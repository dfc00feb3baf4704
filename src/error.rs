//! Error types for pr-automerge

use thiserror::Error;

/// Errors produced while configuring or running the merge bot
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or inconsistent configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable credential
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub API request failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Unexpected response from the platform
    #[error("platform error: {0}")]
    Platform(String),

    /// A git invocation failed for a reason other than a conflict or push rejection
    #[error("git error: {0}")]
    Git(String),

    /// Input could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Merge kept racing with concurrent changes
    #[error("PR #{number} changed concurrently on {attempts} consecutive merge attempts")]
    MergeContention {
        /// PR number
        number: u64,
        /// Number of merge attempts that were rejected
        attempts: u32,
    },

    /// Filesystem or process I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error returned by octocrab
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),
}

impl Error {
    /// Whether this error should abort the run before any platform call
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Auth(_))
    }
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
