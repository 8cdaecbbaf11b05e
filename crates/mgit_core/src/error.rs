//! Error types for mgit_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mgit_core operations.
#[derive(Error, Debug)]
pub enum MgitError {
    /// A working-tree file passed to `add` does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path cannot be staged (absolute, escapes the working tree, not a
    /// regular file, or unrepresentable in the line-oriented formats).
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Blob with the given ID was not found in the object store.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Commit with the given ID was not found in the commit store.
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// Hash verification failed during object read.
    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        /// The expected object ID
        expected: String,
        /// The actual computed hash
        actual: String,
    },

    /// A different commit record already exists under the computed ID.
    #[error("commit id collision: {0} already names a different commit")]
    CommitCollision(String),

    /// The commit record is unreadable or has an invalid format.
    #[error("corrupted commit at {}: {}", path.display(), reason)]
    CorruptedCommit {
        /// Path to the corrupted commit record
        path: PathBuf,
        /// Description of the corruption
        reason: String,
    },

    /// The persisted staging area holds a path that can't be staged.
    #[error("corrupted staging area at {}: {}", path.display(), reason)]
    CorruptedIndex {
        /// Path to the index file
        path: PathBuf,
        /// Description of the bad entry
        reason: String,
    },

    /// Identifier is not usable as an object or commit name.
    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    /// HEAD file content is malformed.
    #[error("invalid HEAD at {}: {}", path.display(), reason)]
    InvalidHead {
        /// Path to the HEAD file
        path: PathBuf,
        /// Description of what's invalid
        reason: String,
    },

    /// A commit named by a parent reference could not be loaded while
    /// walking history.
    #[error("history truncated at {missing}: {reason}")]
    HistoryTruncated {
        /// The commit ID that failed to load
        missing: String,
        /// Why loading failed
        reason: String,
    },

    /// The parent chain leads back to a commit already visited.
    #[error("history cycle detected at commit {0}")]
    HistoryCycle(String),

    /// Writing to the object or commit store failed.
    #[error("failed to persist {what}: {source}")]
    PersistenceFailure {
        /// What was being written
        what: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No repository at the given location.
    #[error("not an mgit repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// A repository already exists at the given location.
    #[error("mgit repository already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// Repository is locked by another process.
    #[error("repository locked by another process")]
    RepositoryLocked,

    /// The capability exists in the interface but has no implementation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MgitError {
    /// Wraps an I/O error raised while writing `what`.
    pub(crate) fn persistence(what: impl Into<String>, source: std::io::Error) -> Self {
        Self::PersistenceFailure {
            what: what.into(),
            source,
        }
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::FileNotFound(_) => Some("Check the path is relative to the repository root."),
            Self::HistoryTruncated { .. } | Self::HistoryCycle(_) => {
                Some("Commit history is damaged. Run 'mgit verify' to see which records are affected.")
            }
            Self::CorruptedCommit { .. } | Self::HashMismatch { .. } => {
                Some("Run 'mgit verify' to identify all corrupted records.")
            }
            Self::NotARepository(_) => Some("Run 'mgit init' to create a repository here."),
            Self::RepositoryLocked => Some(
                "Wait for the other process to finish, or remove .mgit/LOCK if no mgit process is running.",
            ),
            Self::PersistenceFailure { .. } => {
                Some("Check free disk space and permissions on the .mgit directory.")
            }
            Self::CommitCollision(_) => Some(
                "The checksum hash collided. Change the message or switch core.hash_algorithm to blake3 in a new repository.",
            ),
            Self::CorruptedIndex { .. } => {
                Some("Remove the bad line from .mgit/index, or delete the file to clear the staging area.")
            }
            Self::InvalidHead { .. } => {
                Some("HEAD should contain a single line of the form 'ref: <value>'.")
            }
            _ => None,
        }
    }
}

/// Convenience Result type for mgit_core operations.
pub type Result<T> = std::result::Result<T, MgitError>;
