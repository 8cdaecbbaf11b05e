//! Staging area: the paths queued for the next commit.

use crate::atomic::write_atomic;
use crate::error::{MgitError, Result};
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Name of the repository directory; paths inside it are never staged.
pub(crate) const REPO_DIR: &str = ".mgit";

/// Result of staging a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The path was added and its content stored as `blob`.
    Staged {
        /// Normalised working-tree path
        path: String,
        /// Identifier of the stored content
        blob: ObjectId,
        /// Whether the blob was newly written (false when deduplicated)
        new_object: bool,
    },
    /// The path was already pending; nothing was read or written.
    AlreadyStaged(String),
}

/// Ordered, duplicate-free set of staged paths.
///
/// The set is mirrored to a file with one path per line so that separate
/// processes see the same pending commit. Order is insertion order.
pub struct StagingArea {
    file: PathBuf,
    entries: Vec<String>,
    members: HashSet<String>,
    fsync: bool,
}

impl StagingArea {
    /// Loads the staging area persisted at `file`.
    ///
    /// A missing file is an empty staging area.
    ///
    /// # Errors
    ///
    /// Returns `CorruptedIndex` if a line is not a stageable working-tree
    /// path.
    pub fn load(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        let mut area = Self {
            file,
            entries: Vec::new(),
            members: HashSet::new(),
            fsync: true,
        };

        match fs::read_to_string(&area.file) {
            Ok(content) => {
                for line in content.lines().filter(|l| !l.is_empty()) {
                    let path = normalize_path(line).map_err(|e| MgitError::CorruptedIndex {
                        path: area.file.clone(),
                        reason: e.to_string(),
                    })?;
                    area.insert(path);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(MgitError::Io(e)),
        }

        Ok(area)
    }

    /// Enables or disables fsync on writes.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Stages `path`, reading it from `worktree` and storing its content.
    ///
    /// An already-staged path returns [`AddOutcome::AlreadyStaged`] without
    /// touching the file or the object store.
    ///
    /// # Errors
    ///
    /// - `InvalidPath` if `path` is absolute, escapes the working tree,
    ///   points into the repository directory, or is not a regular file
    /// - `FileNotFound` if nothing exists at `path`
    /// - `PersistenceFailure` if the blob or the staging file can't be written
    ///
    /// On error the staging set is unchanged.
    pub fn stage(&mut self, worktree: &Path, path: &str, store: &ObjectStore) -> Result<AddOutcome> {
        let path = normalize_path(path)?;

        if self.contains(&path) {
            info!(path = %path, "already staged");
            return Ok(AddOutcome::AlreadyStaged(path));
        }

        let full_path = worktree.join(&path);
        let content = match fs::read(&full_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MgitError::FileNotFound(PathBuf::from(&path)));
            }
            Err(_) if full_path.is_dir() => {
                return Err(MgitError::InvalidPath {
                    path,
                    reason: "not a regular file".to_string(),
                });
            }
            Err(e) => return Err(MgitError::Io(e)),
        };

        let blob = store.algorithm().hash(&content);
        let new_object = store.put(&blob, &content)?;

        self.insert(path.clone());
        if let Err(e) = self.save() {
            self.remove(&path);
            return Err(e);
        }

        info!(path = %path, blob = %blob, "staged");
        Ok(AddOutcome::Staged {
            path,
            blob,
            new_object,
        })
    }

    /// Returns all staged paths and clears the set, persisting the empty set.
    ///
    /// If persisting fails, the set is restored and the error returned.
    pub fn drain(&mut self) -> Result<Vec<String>> {
        let entries = std::mem::take(&mut self.entries);
        let members = std::mem::take(&mut self.members);

        if let Err(e) = self.save() {
            self.entries = entries;
            self.members = members;
            return Err(e);
        }

        debug!(count = entries.len(), "staging area drained");
        Ok(entries)
    }

    /// Returns `true` if `path` is staged.
    pub fn contains(&self, path: &str) -> bool {
        self.members.contains(path)
    }

    /// Staged paths in insertion order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of staged paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, path: String) -> bool {
        if !self.members.insert(path.clone()) {
            return false;
        }
        self.entries.push(path);
        true
    }

    fn remove(&mut self, path: &str) {
        if self.members.remove(path) {
            self.entries.retain(|p| p != path);
        }
    }

    fn save(&self) -> Result<()> {
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(entry);
            content.push('\n');
        }
        write_atomic(&self.file, content.as_bytes(), self.fsync)
            .map_err(|e| MgitError::persistence("staging area", e))
    }
}

/// Normalises a working-tree path to forward-slash relative form.
///
/// `./a//b.txt` becomes `a/b.txt`.
pub(crate) fn normalize_path(path: &str) -> Result<String> {
    let invalid = |reason: &str| MgitError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.contains('\n') || path.contains('\r') {
        return Err(invalid("contains a line break"));
    }

    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| invalid("not valid UTF-8"))?;
                parts.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("escapes the working tree")),
            Component::RootDir | Component::Prefix(_) => return Err(invalid("must be relative")),
        }
    }

    match parts.first() {
        None => Err(invalid("empty path")),
        Some(&REPO_DIR) => Err(invalid("inside the repository directory")),
        Some(_) => Ok(parts.join("/")),
    }
}
