//! Ephemeral clone used for one rebase

use crate::error::Result;
use crate::git::GitBackend;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// A throwaway clone of the repository
///
/// The working directory is removed when the session is closed or dropped,
/// so every exit path (conflict, push failure, error, panic) cleans up.
#[derive(Debug)]
pub struct RebaseSession {
    dir: TempDir,
}

impl RebaseSession {
    /// Clone `url` into a fresh temporary directory
    pub async fn open(git: &dyn GitBackend, url: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("automerge-").tempdir()?;
        debug!(path = %dir.path().display(), "opened rebase session");
        git.clone_repo(url, dir.path()).await?;
        Ok(Self { dir })
    }

    /// Root of the clone
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the working directory, reporting failures
    pub fn close(self) -> Result<()> {
        debug!(path = %self.dir.path().display(), "closing rebase session");
        self.dir.close()?;
        Ok(())
    }
}
