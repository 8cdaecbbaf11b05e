//! HEAD pointer management.

use crate::atomic::write_atomic;
use crate::error::{MgitError, Result};
use crate::object_id::ObjectId;
use std::fs;
use std::path::{Path, PathBuf};

/// Symbolic value written to HEAD by `init`.
pub const DEFAULT_HEAD_REF: &str = "refs/master";

/// Decoded content of the HEAD file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// HEAD names a branch label and no commit exists yet.
    Symbolic(String),
    /// HEAD names the most recent commit directly.
    Commit(ObjectId),
}

impl Head {
    /// Returns the commit HEAD points at, if any.
    pub fn commit(&self) -> Option<&ObjectId> {
        match self {
            Self::Commit(id) => Some(id),
            Self::Symbolic(_) => None,
        }
    }
}

/// Manages the HEAD file.
///
/// HEAD is a single line `ref: <value>`. After `init` the value is
/// [`DEFAULT_HEAD_REF`]; every successful commit overwrites it with the
/// commit's identifier. All writes are atomic using temp file + rename.
pub struct Refs {
    root: PathBuf,
    fsync: bool,
}

impl Refs {
    /// Creates a new Refs manager for the given repository directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            fsync: true,
        }
    }

    /// Enables or disables fsync on writes.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Path of the HEAD file.
    pub fn head_path(&self) -> PathBuf {
        self.root.join("HEAD")
    }

    /// Reads and decodes HEAD.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHead` if the file is missing or malformed.
    pub fn read_head(&self) -> Result<Head> {
        let path = self.head_path();
        let content = fs::read_to_string(&path).map_err(|e| MgitError::InvalidHead {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let value = content
            .trim()
            .strip_prefix("ref:")
            .map(str::trim)
            .ok_or_else(|| MgitError::InvalidHead {
                path: path.clone(),
                reason: "expected 'ref: <value>'".to_string(),
            })?;

        if value.is_empty() {
            return Err(MgitError::InvalidHead {
                path,
                reason: "empty ref value".to_string(),
            });
        }

        if value.contains('/') {
            return Ok(Head::Symbolic(value.to_string()));
        }

        ObjectId::parse(value)
            .map(Head::Commit)
            .map_err(|_| MgitError::InvalidHead {
                path,
                reason: format!("invalid commit id {:?}", value),
            })
    }

    /// Returns the commit HEAD points at, or `None` before the first commit.
    pub fn head_commit(&self) -> Result<Option<ObjectId>> {
        Ok(self.read_head()?.commit().cloned())
    }

    /// Points HEAD at a symbolic ref.
    pub fn write_symbolic(&self, name: &str) -> Result<()> {
        self.write_head_value(name)
    }

    /// Points HEAD at a commit.
    pub fn write_head(&self, id: &ObjectId) -> Result<()> {
        self.write_head_value(id.as_str())
    }

    fn write_head_value(&self, value: &str) -> Result<()> {
        let line = format!("ref: {}\n", value);
        write_atomic(&self.head_path(), line.as_bytes(), self.fsync)
            .map_err(|e| MgitError::persistence("HEAD", e))
    }
}
