//! Print a stored blob.

use super::open_repo;
use anyhow::{Context, Result};
use mgit_core::ObjectId;
use std::io::Write;

/// Write the raw contents of an object to stdout.
pub fn run(object_id: &str) -> Result<()> {
    let repo = open_repo()?;
    let id = ObjectId::parse(object_id).context("Invalid object ID format")?;

    let content = repo
        .read_object(&id)
        .with_context(|| format!("Failed to read object {}", object_id))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}
