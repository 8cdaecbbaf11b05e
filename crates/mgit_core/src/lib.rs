//! mgit Core Library
//!
//! A minimal local version-control engine, providing:
//! - Content-addressed blob storage
//! - A persistent staging area
//! - Immutable commit records linked by parent
//! - A HEAD pointer and lazy history traversal
//!
//! # Quick Start
//!
//! ```
//! use mgit_core::{CommitOutcome, Repository};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
//!
//! let mut repo = Repository::init(tmp.path()).unwrap();
//! repo.add("notes.txt").unwrap();
//!
//! let commit = match repo.commit("first").unwrap() {
//!     CommitOutcome::Committed(commit) => commit,
//!     CommitOutcome::NothingToCommit => unreachable!(),
//! };
//!
//! let log = repo.log().unwrap().collect_all().unwrap();
//! assert_eq!(log, vec![commit]);
//! ```
//!
//! # Features
//!
//! ## Content-Addressed Storage
//!
//! Blobs are stored under the hash of their content:
//!
//! ```
//! use mgit_core::{HashAlgorithm, ObjectStore};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let store = ObjectStore::new(tmp.path().join("objects"), HashAlgorithm::Blake3);
//!
//! // Same content = same ID (deduplication)
//! let id1 = store.put_blob(b"content").unwrap();
//! let id2 = store.put_blob(b"content").unwrap();
//! assert_eq!(id1, id2);
//! assert_eq!(store.get(&id1).unwrap(), b"content");
//! ```
//!
//! ## Repository Layout
//!
//! ```text
//! .mgit/
//!   HEAD          ref: refs/master | ref: <commit-id>
//!   config.toml   hash algorithm and storage settings
//!   index         staged paths, one per line
//!   LOCK          advisory lock for add/commit
//!   objects/<id>  raw blob content
//!   commits/<id>  line-oriented commit records
//!   refs/
//! ```

mod atomic;
mod commit_store;
mod config;
mod error;
mod hash;
mod history;
mod lock;
mod object_id;
mod object_store;
mod refs;
mod repo;
mod staging;
mod verify;

pub use commit_store::{Commit, CommitOutcome, CommitStore};
pub use config::{Config, CoreConfig, LogConfig, StorageConfig, CONFIG_FILE};
pub use error::{MgitError, Result};
pub use hash::HashAlgorithm;
pub use history::History;
pub use object_id::ObjectId;
pub use object_store::ObjectStore;
pub use refs::{Head, Refs, DEFAULT_HEAD_REF};
pub use repo::{RepoStatus, Repository};
pub use staging::{AddOutcome, StagingArea};
pub use verify::{verify, VerifyConfig, VerifyReport};

/// Time provider trait for testing.
///
/// Allows injecting controlled time into commits for deterministic tests.
/// This is always available but only used when explicitly set via `with_time_provider()`.
pub trait TimeProvider: Send + Sync {
    /// Returns the current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

impl<F> TimeProvider for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn now(&self) -> i64 {
        self()
    }
}
