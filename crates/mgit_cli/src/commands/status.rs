//! Show HEAD and the staging area.

use super::open_repo;
use anyhow::Result;
use console::style;
use mgit_core::Head;

/// Print the current HEAD and staged files.
pub fn run() -> Result<()> {
    let repo = open_repo()?;
    let status = repo.status()?;

    match &status.head {
        Head::Symbolic(name) => println!("On {} (no commits yet)", name),
        Head::Commit(id) => println!("HEAD at {}", style(id.short()).yellow()),
    }
    println!();

    if status.staged.is_empty() {
        println!("Nothing staged.");
    } else {
        println!("Changes to be committed:");
        for path in &status.staged {
            println!("  {}", style(path).green());
        }
    }

    Ok(())
}
