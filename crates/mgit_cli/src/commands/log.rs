//! Show commit history from HEAD.

use super::open_repo;
use anyhow::{Context, Result};
use chrono::DateTime;
use console::style;
use mgit_core::{Commit, History};

/// Print history, newest first.
///
/// A damaged chain prints every commit that could be read, then fails with
/// the truncation error.
pub fn run(max_count: Option<usize>, json: bool) -> Result<()> {
    let repo = open_repo()?;

    let history = match max_count {
        Some(n) => repo.history()?.with_max_count(n),
        None => repo.log()?,
    };

    if json {
        print_json(history)
    } else {
        print_text(history)
    }
}

fn print_text(history: History<'_>) -> Result<()> {
    let mut count = 0;
    for step in history {
        let commit = step.context("Failed to read history")?;
        if count > 0 {
            println!();
        }
        print_commit(&commit);
        count += 1;
    }

    if count == 0 {
        println!("No commits yet.");
    }
    Ok(())
}

fn print_commit(commit: &Commit) {
    let timestamp = DateTime::from_timestamp(commit.timestamp, 0).unwrap_or_default();

    println!("{} {}", style("commit").yellow(), style(&commit.id).yellow());
    if let Some(parent) = &commit.parent {
        println!("Parent: {}", parent);
    }
    println!("Date:   {}", timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    for line in commit.message.lines() {
        println!("    {}", line);
    }
    println!();
    for file in &commit.files {
        println!("    {}", style(file).green());
    }
}

fn print_json(history: History<'_>) -> Result<()> {
    let mut commits = Vec::new();
    let mut failure = None;
    for step in history {
        match step {
            Ok(commit) => commits.push(commit),
            Err(e) => failure = Some(e),
        }
    }

    println!("{}", serde_json::to_string_pretty(&commits)?);

    match failure {
        Some(e) => Err(e).context("Failed to read history"),
        None => Ok(()),
    }
}
