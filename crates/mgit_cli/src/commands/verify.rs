//! Repository verification command.

use super::open_repo;
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mgit_core::VerifyConfig;

/// Verify repository integrity.
pub fn run(objects: bool) -> Result<()> {
    let repo = open_repo()?;

    let config = VerifyConfig {
        check_objects: objects,
        check_commits: true,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(if objects {
        "Verifying commits and object integrity..."
    } else {
        "Verifying commits..."
    });
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = repo.verify(config);
    spinner.finish_and_clear();
    let report = report?;

    println!();
    println!("{}", style("Verification Report:").bold());

    if objects {
        println!(
            "  Objects checked:     {}",
            style(report.objects_checked).cyan()
        );
        if !report.objects_corrupted.is_empty() {
            println!(
                "  Corrupted objects:   {}",
                style(report.objects_corrupted.len()).red()
            );
            for id in &report.objects_corrupted {
                println!("    {} {}", style("×").red(), id);
            }
        }
    }

    println!(
        "  Commits checked:     {}",
        style(report.commits_checked).cyan()
    );
    println!(
        "  Reachable from HEAD: {}",
        style(report.commits_reachable).cyan()
    );
    if report.head_dangling {
        println!("  {} HEAD names a missing commit", style("×").red());
    }
    if !report.commits_invalid.is_empty() {
        println!(
            "  Invalid commits:     {}",
            style(report.commits_invalid.len()).red()
        );
        for id in &report.commits_invalid {
            println!("    {} {}", style("×").red(), id);
        }
    }
    if !report.commits_unreachable.is_empty() {
        println!(
            "  Unreachable commits: {}",
            style(report.commits_unreachable.len()).yellow()
        );
    }
    if let Some(error) = &report.history_error {
        println!("  {} {}", style("⚠").yellow(), error);
    }

    println!();
    if report.has_issues() {
        println!("{}", style(&report.summary()).yellow().bold());
        println!();
        println!("{}", style("Recommendations:").bold());
        if !report.objects_corrupted.is_empty() {
            println!(
                "  {} Corrupted objects can be restored by re-adding the original files",
                style("→").cyan()
            );
        }
        if report.head_dangling || report.history_error.is_some() || !report.commits_invalid.is_empty() {
            println!(
                "  {} Damaged commit records may require manual recovery",
                style("→").cyan()
            );
        }
    } else {
        println!(
            "{} {}",
            style("✓").green(),
            style(&report.summary()).green()
        );
    }

    Ok(())
}
