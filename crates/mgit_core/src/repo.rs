//! Repository handle providing the main mgit API.

use crate::commit_store::{Commit, CommitOutcome, CommitStore};
use crate::config::Config;
use crate::error::{MgitError, Result};
use crate::history::History;
use crate::lock::LockGuard;
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;
use crate::refs::{Head, Refs, DEFAULT_HEAD_REF};
use crate::staging::{AddOutcome, StagingArea, REPO_DIR};
use crate::verify::{VerifyConfig, VerifyReport};
use crate::TimeProvider;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Snapshot of HEAD and the pending commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Current HEAD.
    pub head: Head,
    /// Staged paths in staging order.
    pub staged: Vec<String>,
}

/// mgit repository handle.
///
/// Owns the working-tree root, the stores under `.mgit/`, the HEAD pointer
/// and the staging area. One handle per process; mutating calls take the
/// repository lock for their duration.
pub struct Repository {
    /// Working-tree root (parent of .mgit).
    root: PathBuf,
    /// Settings loaded from config.toml.
    config: Config,
    /// Blob storage.
    objects: ObjectStore,
    /// Commit record storage.
    commits: CommitStore,
    /// HEAD pointer.
    refs: Refs,
    /// Paths queued for the next commit.
    staging: StagingArea,
    /// Time provider for testing (None = use system time).
    time_provider: Option<Arc<dyn TimeProvider>>,
}

impl Repository {
    /// Initializes a new repository with default configuration.
    ///
    /// Creates `.mgit/{objects,commits,refs}`, `config.toml` and a HEAD of
    /// `ref: refs/master`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if `.mgit` exists, or an I/O error if
    /// directory creation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use mgit_core::Repository;
    /// use tempfile::TempDir;
    ///
    /// let tmp = TempDir::new().unwrap();
    /// let repo = Repository::init(tmp.path()).unwrap();
    /// assert_eq!(repo.head_id().unwrap(), None);
    /// ```
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        Self::init_with_config(path, Config::default())
    }

    /// Initializes a new repository with the given configuration.
    pub fn init_with_config(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let repo_dir = root.join(REPO_DIR);

        if repo_dir.exists() {
            return Err(MgitError::AlreadyInitialized(root));
        }

        fs::create_dir_all(repo_dir.join("objects"))?;
        fs::create_dir_all(repo_dir.join("commits"))?;
        fs::create_dir_all(repo_dir.join("refs"))?;
        config.save(&repo_dir)?;

        let repo = Self::assemble(root, config)?;
        repo.refs.write_symbolic(DEFAULT_HEAD_REF)?;

        info!(path = %repo.repo_dir().display(), "initialized repository");
        Ok(repo)
    }

    /// Opens an existing repository rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotARepository` if `path/.mgit/HEAD` doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let repo_dir = root.join(REPO_DIR);

        if !repo_dir.join("HEAD").is_file() {
            return Err(MgitError::NotARepository(root));
        }

        let config = Config::load(&repo_dir)?;
        Self::assemble(root, config)
    }

    /// Opens the repository containing `start`, searching parent directories.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        for dir in start.ancestors() {
            if dir.join(REPO_DIR).join("HEAD").is_file() {
                return Self::open(dir);
            }
        }
        Err(MgitError::NotARepository(start.to_path_buf()))
    }

    fn assemble(root: PathBuf, config: Config) -> Result<Self> {
        let repo_dir = root.join(REPO_DIR);
        let algorithm = config.core.hash_algorithm;
        let fsync = config.storage.fsync;

        let objects = ObjectStore::new(repo_dir.join("objects"), algorithm).with_fsync(fsync);
        let commits = CommitStore::new(repo_dir.join("commits"), algorithm).with_fsync(fsync);
        let refs = Refs::new(&repo_dir).with_fsync(fsync);
        let staging = StagingArea::load(repo_dir.join("index"))?.with_fsync(fsync);

        Ok(Self {
            root,
            config,
            objects,
            commits,
            refs,
            staging,
            time_provider: None,
        })
    }

    /// Sets a custom time provider for testing.
    ///
    /// Commit timestamps come from this provider instead of the system clock.
    pub fn with_time_provider(
        mut self,
        provider: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    /// Returns the working-tree root (parent of `.mgit`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .mgit directory path.
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join(REPO_DIR)
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the blob store.
    pub fn object_store(&self) -> &ObjectStore {
        &self.objects
    }

    /// Returns the commit store.
    pub fn commit_store(&self) -> &CommitStore {
        &self.commits
    }

    /// Returns the HEAD manager.
    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Stages a working-tree file for the next commit.
    ///
    /// `path` is relative to the working-tree root. Staging a path that is
    /// already pending returns [`AddOutcome::AlreadyStaged`] and changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file doesn't exist, `InvalidPath` for
    /// paths outside the working tree, and `PersistenceFailure` if the blob
    /// can't be stored. The staging area is unchanged on error.
    pub fn add(&mut self, path: &str) -> Result<AddOutcome> {
        let _lock = self.lock()?;
        self.reload_staging()?;
        self.staging.stage(&self.root, path, &self.objects)
    }

    /// Commits the staged files with `message`.
    ///
    /// The new commit's parent is the current HEAD commit. On success HEAD
    /// names the new commit and the staging area is empty. With nothing
    /// staged this returns [`CommitOutcome::NothingToCommit`] and writes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` or `CommitCollision` if the commit can't
    /// be written, and `CorruptedIndex` if the staging file is damaged. HEAD
    /// and the staging area are then unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use mgit_core::{CommitOutcome, Repository};
    /// use tempfile::TempDir;
    ///
    /// let tmp = TempDir::new().unwrap();
    /// std::fs::write(tmp.path().join("a.txt"), "hi").unwrap();
    ///
    /// let mut repo = Repository::init(tmp.path()).unwrap();
    /// assert_eq!(repo.commit("empty").unwrap(), CommitOutcome::NothingToCommit);
    ///
    /// repo.add("a.txt").unwrap();
    /// let outcome = repo.commit("first").unwrap();
    /// assert!(matches!(outcome, CommitOutcome::Committed(_)));
    /// assert!(repo.staged().is_empty());
    /// ```
    pub fn commit(&mut self, message: &str) -> Result<CommitOutcome> {
        let _lock = self.lock()?;
        self.reload_staging()?;

        if self.staging.is_empty() {
            info!("no changes to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let previous = self.refs.read_head()?;
        let parent = previous.commit().cloned();
        let files = self.staging.entries().to_vec();
        let outcome = self
            .commits
            .commit(&self.refs, message, self.now(), parent, files)?;

        if let CommitOutcome::Committed(commit) = &outcome {
            if let Err(e) = self.staging.drain() {
                warn!(commit = %commit.id, error = %e, "staging area not cleared, restoring HEAD");
                self.restore_head(&previous);
                return Err(e);
            }
        }

        Ok(outcome)
    }

    /// Points HEAD back at `previous` after a partially applied commit.
    ///
    /// The orphaned record stays in the commit store and shows up as
    /// unreachable in `verify`.
    fn restore_head(&self, previous: &Head) {
        let restored = match previous {
            Head::Symbolic(name) => self.refs.write_symbolic(name),
            Head::Commit(id) => self.refs.write_head(id),
        };
        if let Err(e) = restored {
            warn!(error = %e, "failed to restore HEAD");
        }
    }

    /// Walks history from HEAD, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD can't be read. Damaged history surfaces as
    /// an `Err(HistoryTruncated)` item from the iterator.
    pub fn log(&self) -> Result<History<'_>> {
        let head = self.refs.head_commit()?;
        let history = History::new(&self.commits, head);
        Ok(match self.config.log.default_limit {
            Some(limit) => history.with_max_count(limit),
            None => history,
        })
    }

    /// Walks history from HEAD without the configured display limit.
    pub fn history(&self) -> Result<History<'_>> {
        Ok(History::new(&self.commits, self.refs.head_commit()?))
    }

    /// Returns the current HEAD commit ID, or `None` before the first commit.
    pub fn head_id(&self) -> Result<Option<ObjectId>> {
        self.refs.head_commit()
    }

    /// Returns the current HEAD commit, or `None` before the first commit.
    pub fn head(&self) -> Result<Option<Commit>> {
        match self.head_id()? {
            Some(id) => self.commits.load(&id).map(Some),
            None => Ok(None),
        }
    }

    /// Staged paths in staging order.
    pub fn staged(&self) -> &[String] {
        self.staging.entries()
    }

    /// Returns HEAD and the staged paths.
    pub fn status(&self) -> Result<RepoStatus> {
        Ok(RepoStatus {
            head: self.refs.read_head()?,
            staged: self.staging.entries().to_vec(),
        })
    }

    /// Reads a blob from the object store.
    pub fn read_object(&self, id: &ObjectId) -> Result<Vec<u8>> {
        self.objects.get(id)
    }

    /// Verify repository integrity.
    ///
    /// See `crate::verify::verify` for details.
    pub fn verify(&self, config: VerifyConfig) -> Result<VerifyReport> {
        crate::verify::verify(&self.refs, &self.objects, &self.commits, config)
    }

    /// Creates a branch. Not implemented.
    pub fn branch(&mut self, _name: &str) -> Result<()> {
        Err(MgitError::NotImplemented("branch"))
    }

    /// Switches the working tree to a branch or commit. Not implemented.
    pub fn checkout(&mut self, _target: &str) -> Result<()> {
        Err(MgitError::NotImplemented("checkout"))
    }

    /// Merges a branch into HEAD. Not implemented.
    pub fn merge(&mut self, _branch: &str) -> Result<()> {
        Err(MgitError::NotImplemented("merge"))
    }

    /// Compares two commits. Not implemented.
    pub fn diff(&self, _from: &ObjectId, _to: &ObjectId) -> Result<String> {
        Err(MgitError::NotImplemented("diff"))
    }

    fn lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(&self.repo_dir().join("LOCK"))
    }

    /// Picks up staging changes made by other handles.
    fn reload_staging(&mut self) -> Result<()> {
        self.staging = StagingArea::load(self.repo_dir().join("index"))?
            .with_fsync(self.config.storage.fsync);
        Ok(())
    }

    fn now(&self) -> i64 {
        match &self.time_provider {
            Some(provider) => provider.now(),
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default(),
        }
    }
}
