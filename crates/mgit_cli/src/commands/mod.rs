//! CLI commands.

use anyhow::{Context, Result};
use mgit_core::Repository;

pub mod add;
pub mod cat_object;
pub mod commit;
pub mod init;
pub mod log;
pub mod status;
pub mod unimplemented;
pub mod verify;

/// Opens the repository containing the current directory.
pub fn open_repo() -> Result<Repository> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let repo = Repository::discover(&cwd)
        .context("Not an mgit repository (or any parent directory)")?;
    tracing::debug!(root = %repo.root().display(), "opened repository");
    Ok(repo)
}
