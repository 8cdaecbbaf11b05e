//! Commands reserved for branching and comparison.

use super::open_repo;
use anyhow::{Context, Result};
use mgit_core::ObjectId;

/// Create a branch. Always fails with `NotImplemented`.
pub fn branch(name: &str) -> Result<()> {
    open_repo()?.branch(name)?;
    Ok(())
}

/// Switch to a branch or commit. Always fails with `NotImplemented`.
pub fn checkout(target: &str) -> Result<()> {
    open_repo()?.checkout(target)?;
    Ok(())
}

/// Merge a branch into HEAD. Always fails with `NotImplemented`.
pub fn merge(branch: &str) -> Result<()> {
    open_repo()?.merge(branch)?;
    Ok(())
}

/// Compare two commits. Always fails with `NotImplemented`.
pub fn diff(from: &str, to: &str) -> Result<()> {
    let from = ObjectId::parse(from).context("Invalid commit ID")?;
    let to = ObjectId::parse(to).context("Invalid commit ID")?;
    print!("{}", open_repo()?.diff(&from, &to)?);
    Ok(())
}
