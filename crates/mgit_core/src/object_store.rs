//! Content-addressed blob storage.

use crate::atomic::write_atomic;
use crate::error::{MgitError, Result};
use crate::hash::HashAlgorithm;
use crate::object_id::ObjectId;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Content-addressed blob storage.
///
/// Each blob is a single file under the store root, named by its identifier
/// and holding the raw content. Writing an identifier that already exists is
/// a no-op, so content under an identifier never changes once written.
///
/// # Examples
///
/// ```
/// use mgit_core::{HashAlgorithm, ObjectStore};
/// use tempfile::TempDir;
///
/// let tmp = TempDir::new().unwrap();
/// let store = ObjectStore::new(tmp.path(), HashAlgorithm::Blake3);
///
/// let id = store.put_blob(b"hello world").unwrap();
/// assert_eq!(store.get(&id).unwrap(), b"hello world");
/// ```
pub struct ObjectStore {
    root: PathBuf,
    algorithm: HashAlgorithm,
    fsync: bool,
}

impl ObjectStore {
    /// Creates a new ObjectStore at the given root directory.
    ///
    /// The directory is created on first write.
    pub fn new(root: impl AsRef<Path>, algorithm: HashAlgorithm) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            algorithm,
            fsync: true,
        }
    }

    /// Enables or disables fsync on writes.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Returns the root directory of this object store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the hash algorithm used to address blobs.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Stores `content` under `id`.
    ///
    /// Returns `true` if the object was written and `false` if `id` was
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if directory creation or writing fails.
    pub fn put(&self, id: &ObjectId, content: &[u8]) -> Result<bool> {
        if self.exists(id) {
            debug!(object = %id, "object already stored");
            return Ok(false);
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| MgitError::persistence(format!("objects directory {}", self.root.display()), e))?;
        write_atomic(&self.object_path(id), content, self.fsync)
            .map_err(|e| MgitError::persistence(format!("blob {}", id), e))?;

        debug!(object = %id, size = content.len(), "stored blob");
        Ok(true)
    }

    /// Hashes `content` and stores it, returning its identifier.
    ///
    /// Storing the same content twice yields the same ID and writes once.
    pub fn put_blob(&self, content: &[u8]) -> Result<ObjectId> {
        let id = self.algorithm.hash(content);
        self.put(&id, content)?;
        Ok(id)
    }

    /// Retrieves raw bytes by their identifier.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the object doesn't exist.
    pub fn get(&self, id: &ObjectId) -> Result<Vec<u8>> {
        let path = self.object_path(id);
        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MgitError::ObjectNotFound(id.to_string()))
            }
            Err(e) => Err(MgitError::Io(e)),
        }
    }

    /// Reads an object and checks that its content still hashes to `id`.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the object doesn't exist and
    /// `HashMismatch` if the content has been altered.
    pub fn verify(&self, id: &ObjectId) -> Result<()> {
        let content = self.get(id)?;
        let actual = self.algorithm.hash(&content);
        if &actual != id {
            return Err(MgitError::HashMismatch {
                expected: id.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    /// Checks if an object exists in the store.
    pub fn exists(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    /// Lists all objects in the store, sorted by identifier.
    ///
    /// Temp files and names that are not valid identifiers are skipped.
    pub fn list(&self) -> Result<Vec<ObjectId>> {
        list_ids(&self.root)
    }

    /// Computes the filesystem path for an object.
    fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

/// Lists the identifier-named files directly under `dir`.
pub(crate) fn list_ids(dir: &Path) -> Result<Vec<ObjectId>> {
    let mut ids = Vec::new();

    if !dir.exists() {
        return Ok(ids);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        // Skip non-files and temp files
        if !path.is_file() || path.extension().is_some() {
            continue;
        }

        if let Some(id) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| ObjectId::parse(n).ok())
        {
            ids.push(id);
        }
    }

    ids.sort();
    Ok(ids)
}
