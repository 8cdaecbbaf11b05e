//! Commit records and their on-disk store.

use crate::atomic::write_atomic;
use crate::error::{MgitError, Result};
use crate::hash::HashAlgorithm;
use crate::object_id::ObjectId;
use crate::object_store::list_ids;
use crate::refs::Refs;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An immutable commit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Identifier derived from the other fields.
    pub id: ObjectId,
    /// Commit message.
    pub message: String,
    /// Creation time in Unix seconds.
    pub timestamp: i64,
    /// Previous commit, `None` for the root commit.
    pub parent: Option<ObjectId>,
    /// Committed working-tree paths in staging order.
    pub files: Vec<String>,
}

impl Commit {
    /// Builds a commit, deriving its identifier with `algorithm`.
    pub fn new(
        algorithm: HashAlgorithm,
        message: impl Into<String>,
        timestamp: i64,
        parent: Option<ObjectId>,
        files: Vec<String>,
    ) -> Self {
        let message = message.into();
        let id = algorithm.commit_id(&message, timestamp, parent.as_ref(), &files);
        Self {
            id,
            message,
            timestamp,
            parent,
            files,
        }
    }

    /// Returns `true` for a commit without parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Renders the line-oriented record stored in `commits/<id>`.
    ///
    /// ```text
    /// Message: <text>
    /// Timestamp: <integer>
    /// Parent: <hash-or-empty>
    /// Files:
    /// <path>
    /// ```
    pub fn encode(&self) -> String {
        let mut out = format!(
            "Message: {}\nTimestamp: {}\nParent: {}\nFiles:\n",
            escape_message(&self.message),
            self.timestamp,
            self.parent.as_ref().map(ObjectId::as_str).unwrap_or(""),
        );
        for file in &self.files {
            out.push_str(file);
            out.push('\n');
        }
        out
    }

    /// Parses a record produced by [`Commit::encode`].
    ///
    /// The returned error string describes the first malformed line.
    fn decode(id: ObjectId, text: &str) -> std::result::Result<Self, String> {
        let mut lines = text.lines();

        let message = unescape_message(header(&mut lines, "Message")?)?;
        let timestamp = header(&mut lines, "Timestamp")?
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid timestamp: {}", e))?;
        let parent = match header(&mut lines, "Parent")?.trim() {
            "" => None,
            value => Some(
                ObjectId::parse(value).map_err(|_| format!("invalid parent {:?}", value))?,
            ),
        };
        let files_header = header(&mut lines, "Files")?;
        if !files_header.trim().is_empty() {
            return Err(format!("unexpected text after 'Files:': {:?}", files_header));
        }
        let files = lines
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            id,
            message,
            timestamp,
            parent,
            files,
        })
    }
}

/// Result of a commit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was persisted and HEAD now names it.
    Committed(Commit),
    /// The file list was empty; nothing was written.
    NothingToCommit,
}

/// Persists commit records under their identifiers.
///
/// Each commit lives in its own text file inside the store root. A record
/// is never replaced by a different one: re-writing an identical record is
/// a no-op, and a colliding identifier is refused.
pub struct CommitStore {
    root: PathBuf,
    algorithm: HashAlgorithm,
    fsync: bool,
}

impl CommitStore {
    /// Creates a commit store rooted at `root`.
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

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a commit from `files` and advances HEAD to it.
    ///
    /// Steps:
    /// 1. an empty `files` returns [`CommitOutcome::NothingToCommit`]
    /// 2. the identifier is derived from message, timestamp, parent and files
    /// 3. the record is written to `commits/<id>`
    /// 4. HEAD is rewritten to `ref: <id>`
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the record or HEAD can't be written,
    /// and `CommitCollision` if a different record already owns the
    /// identifier. HEAD is only touched after the record is durable.
    pub fn commit(
        &self,
        refs: &Refs,
        message: &str,
        timestamp: i64,
        parent: Option<ObjectId>,
        files: Vec<String>,
    ) -> Result<CommitOutcome> {
        if files.is_empty() {
            info!("nothing to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let commit = Commit::new(self.algorithm, message, timestamp, parent, files);
        self.save(&commit)?;
        refs.write_head(&commit.id)?;

        info!(commit = %commit.id, files = commit.files.len(), "committed");
        Ok(CommitOutcome::Committed(commit))
    }

    /// Writes a commit record.
    pub fn save(&self, commit: &Commit) -> Result<()> {
        let path = self.commit_path(&commit.id);

        if path.exists() {
            let existing = self.load(&commit.id).ok();
            if existing.as_ref() == Some(commit) {
                debug!(commit = %commit.id, "commit already stored");
                return Ok(());
            }
            return Err(MgitError::CommitCollision(commit.id.to_string()));
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| MgitError::persistence(format!("commits directory {}", self.root.display()), e))?;
        write_atomic(&path, commit.encode().as_bytes(), self.fsync)
            .map_err(|e| MgitError::persistence(format!("commit {}", commit.id), e))
    }

    /// Loads and validates the commit stored under `id`.
    ///
    /// # Errors
    ///
    /// - `CommitNotFound` if no record exists
    /// - `CorruptedCommit` if the record can't be parsed or its content no
    ///   longer hashes to `id`
    pub fn load(&self, id: &ObjectId) -> Result<Commit> {
        let path = self.commit_path(id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MgitError::CommitNotFound(id.to_string()));
            }
            Err(e) => {
                return Err(MgitError::CorruptedCommit {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let commit = Commit::decode(id.clone(), &text)
            .map_err(|reason| MgitError::CorruptedCommit {
                path: path.clone(),
                reason,
            })?;

        let expected = self.algorithm.commit_id(
            &commit.message,
            commit.timestamp,
            commit.parent.as_ref(),
            &commit.files,
        );
        if &expected != id {
            return Err(MgitError::CorruptedCommit {
                path,
                reason: format!("content hashes to {}", expected),
            });
        }

        Ok(commit)
    }

    /// Checks if a commit record exists.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.commit_path(id).is_file()
    }

    /// Lists all stored commit identifiers, sorted.
    pub fn list(&self) -> Result<Vec<ObjectId>> {
        list_ids(&self.root)
    }

    fn commit_path(&self, id: &ObjectId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

/// Consumes the next line, which must start with `<name>:`.
fn header<'a>(lines: &mut std::str::Lines<'a>, name: &str) -> std::result::Result<&'a str, String> {
    let line = lines
        .next()
        .ok_or_else(|| format!("missing {} line", name))?;
    let rest = line
        .strip_prefix(name)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or_else(|| format!("expected '{}:', got {:?}", name, line))?;
    Ok(rest.strip_prefix(' ').unwrap_or(rest))
}

fn escape_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_message(escaped: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            other => {
                return Err(format!(
                    "invalid escape in message: \\{}",
                    other.map(String::from).unwrap_or_default()
                ))
            }
        }
    }
    Ok(out)
}
