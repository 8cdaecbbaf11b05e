//! Object identification for blobs and commits.

use crate::error::{MgitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a blob or commit.
///
/// The string form depends on the repository's [`HashAlgorithm`]: 64 hex
/// characters for BLAKE3, a decimal number for the additive checksum. Either
/// way the identifier doubles as a file name inside `objects/` and `commits/`,
/// so only ASCII alphanumerics are accepted.
///
/// [`HashAlgorithm`]: crate::HashAlgorithm
///
/// # Examples
///
/// ```
/// use mgit_core::ObjectId;
///
/// let id = ObjectId::parse("1a2b3c").unwrap();
/// assert_eq!(id.as_str(), "1a2b3c");
/// assert!(ObjectId::parse("../HEAD").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Longest identifier accepted by [`ObjectId::parse`].
    pub const MAX_LEN: usize = 128;

    /// Parses an identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `MgitError::InvalidObjectId` if the string is empty, longer
    /// than [`ObjectId::MAX_LEN`], or contains anything but ASCII
    /// alphanumerics.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty()
            || s.len() > Self::MAX_LEN
            || !s.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(MgitError::InvalidObjectId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Builds an identifier from a string already known to be valid.
    pub(crate) fn from_trusted(s: String) -> Self {
        debug_assert!(!s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric()));
        Self(s)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an abbreviated form for display (at most 12 characters).
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short())
    }
}

impl FromStr for ObjectId {
    type Err = MgitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = MgitError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
