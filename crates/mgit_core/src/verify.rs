//! Repository verification.
//!
//! Checks that HEAD resolves, that the history chain is intact, and that
//! stored records still match their identifiers.

use crate::commit_store::CommitStore;
use crate::error::{MgitError, Result};
use crate::history::History;
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use crate::refs::Refs;
use std::collections::HashSet;

/// Configuration for repository verification.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Re-hash every blob in the object store (slow).
    pub check_objects: bool,

    /// Walk history from HEAD and load every stored commit.
    pub check_commits: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            check_objects: false,
            check_commits: true,
        }
    }
}

/// Report from repository verification.
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Total number of blobs checked.
    pub objects_checked: usize,

    /// Blobs whose content no longer matches their identifier.
    pub objects_corrupted: Vec<ObjectId>,

    /// HEAD names a commit that is not stored.
    pub head_dangling: bool,

    /// Number of commits reached from HEAD.
    pub commits_reachable: usize,

    /// Number of commit records checked.
    pub commits_checked: usize,

    /// Commit records that fail to load or validate.
    pub commits_invalid: Vec<ObjectId>,

    /// Stored commits not reachable from HEAD.
    pub commits_unreachable: Vec<ObjectId>,

    /// Error that stopped the history walk, if any.
    pub history_error: Option<String>,
}

impl VerifyReport {
    /// Returns true if any issues were found.
    ///
    /// Unreachable commits are reported but not counted as issues.
    pub fn has_issues(&self) -> bool {
        !self.objects_corrupted.is_empty()
            || self.head_dangling
            || !self.commits_invalid.is_empty()
            || self.history_error.is_some()
    }

    /// Returns a summary message.
    pub fn summary(&self) -> String {
        if !self.has_issues() {
            "Repository is healthy. No issues found.".to_string()
        } else {
            let mut issues = Vec::new();
            if !self.objects_corrupted.is_empty() {
                issues.push(format!("{} corrupted objects", self.objects_corrupted.len()));
            }
            if self.head_dangling {
                issues.push("dangling HEAD".to_string());
            }
            if !self.commits_invalid.is_empty() {
                issues.push(format!("{} invalid commits", self.commits_invalid.len()));
            }
            if self.history_error.is_some() {
                issues.push("broken history".to_string());
            }
            format!("Repository has issues: {}", issues.join(", "))
        }
    }
}

/// Verify repository integrity.
///
/// # Errors
///
/// Returns an error only if HEAD can't be read or a store directory can't
/// be listed; damaged records are collected in the report.
pub fn verify(
    refs: &Refs,
    objects: &ObjectStore,
    commits: &CommitStore,
    config: VerifyConfig,
) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    let head = refs.head_commit()?;
    if let Some(id) = &head {
        report.head_dangling = !commits.contains(id);
    }

    if config.check_commits {
        check_commits(head, commits, &mut report)?;
    }

    if config.check_objects {
        check_objects(objects, &mut report)?;
    }

    Ok(report)
}

/// Walks history from HEAD, then validates every stored record.
fn check_commits(
    head: Option<ObjectId>,
    commits: &CommitStore,
    report: &mut VerifyReport,
) -> Result<()> {
    let mut reachable = HashSet::new();
    for step in History::new(commits, head) {
        match step {
            Ok(commit) => {
                reachable.insert(commit.id);
            }
            Err(e) => report.history_error = Some(e.to_string()),
        }
    }
    report.commits_reachable = reachable.len();

    for id in commits.list()? {
        report.commits_checked += 1;
        if commits.load(&id).is_err() {
            report.commits_invalid.push(id);
        } else if !reachable.contains(&id) {
            report.commits_unreachable.push(id);
        }
    }

    Ok(())
}

/// Re-hashes every stored blob.
fn check_objects(objects: &ObjectStore, report: &mut VerifyReport) -> Result<()> {
    for id in objects.list()? {
        report.objects_checked += 1;
        match objects.verify(&id) {
            Ok(()) => {}
            Err(MgitError::HashMismatch { .. }) => report.objects_corrupted.push(id),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
