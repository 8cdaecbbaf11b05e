//! Stage files for the next commit.

use super::open_repo;
use anyhow::{Context, Result};
use console::style;
use mgit_core::AddOutcome;
use std::path::{Component, Path, PathBuf};

/// Stage each path, resolving it against the current directory.
pub fn run(paths: &[String]) -> Result<()> {
    let mut repo = open_repo()?;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    for path in paths {
        let relative = worktree_path(repo.root(), &cwd, path)?;
        let outcome = repo
            .add(&relative)
            .with_context(|| format!("Failed to stage '{}'", path))?;

        match outcome {
            AddOutcome::Staged {
                path,
                blob,
                new_object,
            } => {
                let note = if new_object { "" } else { " (content already stored)" };
                println!(
                    "{} {} {}{}",
                    style("staged").green(),
                    path,
                    style(blob.short()).dim(),
                    note
                );
            }
            AddOutcome::AlreadyStaged(path) => {
                println!("{} {}", style("already staged").yellow(), path);
            }
        }
    }

    Ok(())
}

/// Converts a path given on the command line into a working-tree path.
///
/// `..` is resolved lexically against `cwd` before the repository root is
/// stripped.
fn worktree_path(root: &Path, cwd: &Path, path: &str) -> Result<String> {
    let mut full = PathBuf::new();
    for component in cwd.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                full.pop();
            }
            other => full.push(other),
        }
    }

    let relative = full.strip_prefix(root).with_context(|| {
        format!("'{}' is outside the repository at {}", path, root.display())
    })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
