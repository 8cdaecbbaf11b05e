//! Lazy traversal of the commit chain.

use crate::commit_store::{Commit, CommitStore};
use crate::error::{MgitError, Result};
use crate::object_id::ObjectId;
use std::collections::HashSet;
use std::iter::FusedIterator;
use tracing::warn;

/// Iterator over commits from a starting point back to the root.
///
/// Yields `Ok(commit)` for every loadable commit, following parent links.
/// The walk ends with `None` after the root commit. If a commit cannot be
/// loaded the iterator yields a single `Err(HistoryTruncated)` and then
/// ends, so callers can tell a damaged chain from a complete one. A parent
/// link leading back to a visited commit yields `Err(HistoryCycle)`.
///
/// # Examples
///
/// ```
/// use mgit_core::{History, CommitStore, HashAlgorithm};
/// use tempfile::TempDir;
///
/// let tmp = TempDir::new().unwrap();
/// let store = CommitStore::new(tmp.path(), HashAlgorithm::Blake3);
///
/// // No head yet: nothing to walk
/// assert_eq!(History::new(&store, None).count(), 0);
/// ```
pub struct History<'a> {
    store: &'a CommitStore,
    next: Option<ObjectId>,
    visited: HashSet<ObjectId>,
    remaining: Option<usize>,
}

impl<'a> History<'a> {
    /// Starts a walk at `start`; `None` walks nothing.
    pub fn new(store: &'a CommitStore, start: Option<ObjectId>) -> Self {
        Self {
            store,
            next: start,
            visited: HashSet::new(),
            remaining: None,
        }
    }

    /// Stops after `max_count` commits.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.remaining = Some(max_count);
        self
    }

    /// Collects the whole walk, failing on the first error.
    pub fn collect_all(self) -> Result<Vec<Commit>> {
        self.collect()
    }
}

impl Iterator for History<'_> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }

        let id = self.next.take()?;

        if !self.visited.insert(id.clone()) {
            warn!(commit = %id, "parent chain loops back");
            return Some(Err(MgitError::HistoryCycle(id.to_string())));
        }

        match self.store.load(&id) {
            Ok(commit) => {
                self.next = commit.parent.clone();
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                Some(Ok(commit))
            }
            Err(e) => {
                warn!(commit = %id, error = %e, "history truncated");
                Some(Err(MgitError::HistoryTruncated {
                    missing: id.to_string(),
                    reason: e.to_string(),
                }))
            }
        }
    }
}

impl FusedIterator for History<'_> {}
