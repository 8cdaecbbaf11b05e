//! Content hashing for blobs and commit records.

use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};

/// Envelope magic mixed into every BLAKE3 hash.
const MAGIC: &[u8; 5] = b"MGIT1";

/// Record kind discriminant for the canonical envelope.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecordKind {
    Blob = 1,
    Commit = 2,
}

/// Hash function used to derive identifiers.
///
/// The algorithm is fixed when a repository is initialised and recorded in
/// its `config.toml`; identifiers from different algorithms never mix.
///
/// # Examples
///
/// ```
/// use mgit_core::HashAlgorithm;
///
/// let a = HashAlgorithm::Blake3.hash(b"hi");
/// let b = HashAlgorithm::Blake3.hash(b"hi");
/// assert_eq!(a, b);
///
/// assert_eq!(HashAlgorithm::Checksum.hash(b"hi").as_str(), "209");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 over a length-prefixed envelope, rendered as 64 hex chars.
    #[default]
    Blake3,
    /// Sum of unsigned bytes rendered as a decimal string.
    ///
    /// Cheap and collision-prone. Commit hashes under this algorithm do not
    /// change when the file list is reordered.
    Checksum,
}

impl HashAlgorithm {
    /// Computes the identifier of blob content.
    pub fn hash(self, content: &[u8]) -> ObjectId {
        match self {
            Self::Blake3 => blake3_id(&envelope(RecordKind::Blob, content)),
            Self::Checksum => decimal_id(checksum(content)),
        }
    }

    /// Computes the identifier of a commit record.
    ///
    /// BLAKE3 hashes every field in order, so reordering `files` or changing
    /// `parent` yields a different identifier.
    pub fn commit_id(
        self,
        message: &str,
        timestamp: i64,
        parent: Option<&ObjectId>,
        files: &[String],
    ) -> ObjectId {
        match self {
            Self::Blake3 => {
                let mut payload = Vec::new();
                push_field(&mut payload, message.as_bytes());
                payload.extend_from_slice(&timestamp.to_le_bytes());
                push_field(&mut payload, parent.map(ObjectId::as_str).unwrap_or("").as_bytes());
                payload.extend_from_slice(&(files.len() as u64).to_le_bytes());
                for file in files {
                    push_field(&mut payload, file.as_bytes());
                }
                blake3_id(&envelope(RecordKind::Commit, &payload))
            }
            Self::Checksum => {
                let mut sum = checksum(message.as_bytes()).wrapping_add(timestamp as u64);
                if let Some(parent) = parent {
                    sum = sum.wrapping_add(checksum(parent.as_str().as_bytes()));
                }
                for file in files {
                    sum = sum.wrapping_add(checksum(file.as_bytes()));
                }
                decimal_id(sum)
            }
        }
    }
}

fn checksum(content: &[u8]) -> u64 {
    content
        .iter()
        .fold(0u64, |sum, &b| sum.wrapping_add(u64::from(b)))
}

fn decimal_id(sum: u64) -> ObjectId {
    ObjectId::from_trusted(sum.to_string())
}

fn blake3_id(canonical: &[u8]) -> ObjectId {
    let hash = blake3::hash(canonical);
    ObjectId::from_trusted(hex::encode(hash.as_bytes()))
}

fn push_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u64).to_le_bytes());
    out.extend_from_slice(field);
}

/// Constructs canonical bytes for hashing.
///
/// Format:
/// - Magic: "MGIT1" (5 bytes)
/// - Kind: u8 (1 byte)
/// - Length: u64 LE (8 bytes)
/// - Payload: variable bytes
fn envelope(kind: RecordKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + 1 + 8 + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(kind as u8);
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(payload);
    out
}
