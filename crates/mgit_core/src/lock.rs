//! Advisory repository lock.

use crate::error::{MgitError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;

/// RAII guard for the repository lock.
///
/// Holds an exclusive `flock` on `.mgit/LOCK`. The OS drops the lock when
/// the process exits, so a crashed holder never leaves a stale lock.
pub(crate) struct LockGuard {
    file: File,
}

impl LockGuard {
    /// Takes the lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryLocked` if another handle holds it.
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        file.try_lock_exclusive()
            .map_err(|_| MgitError::RepositoryLocked)?;

        debug!(path = %path.display(), "repository lock acquired");
        Ok(Self { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
