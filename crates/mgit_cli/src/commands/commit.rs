//! Commit command for recording the staged files.

use super::open_repo;
use anyhow::{Context, Result};
use console::style;
use mgit_core::CommitOutcome;

/// Create a new commit from the staging area.
pub fn run(message: &str) -> Result<()> {
    let mut repo = open_repo()?;

    match repo.commit(message).context("Failed to create commit")? {
        CommitOutcome::Committed(commit) => {
            let kind = if commit.is_root() { " (root-commit)" } else { "" };
            println!(
                "[{}{}] {}",
                style(commit.id.short()).yellow(),
                kind,
                commit.message.lines().next().unwrap_or("")
            );
            println!(" {} file(s) committed", commit.files.len());
        }
        CommitOutcome::NothingToCommit => {
            println!("Nothing to commit (use \"mgit add\" to stage files)");
        }
    }

    Ok(())
}
