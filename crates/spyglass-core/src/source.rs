//! Source snapshots: immutable text plus a content hash used as cache identity.
//!
//! A [`SourceCode`] is a value, not an entity: two snapshots with the same
//! content are interchangeable regardless of path. Every derived structure
//! (symbol tables, resolved classes, frames) is keyed by [`ContentHash`] and
//! recomputed when the hash changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::span::Span;

/// Hash type for content identity (SHA-256, stored as hex for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based byte position into a source text: the universal query key.
///
/// Invariant: `0 <= offset <= text.len()`. Offsets beyond the text are clamped
/// by the queries that consume them rather than rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ByteOffset(pub usize);

impl ByteOffset {
    pub fn new(offset: usize) -> Self {
        ByteOffset(offset)
    }

    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for ByteOffset {
    fn from(offset: usize) -> Self {
        ByteOffset(offset)
    }
}

impl fmt::Display for ByteOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable source file snapshot: logical path, full text, content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCode {
    path: String,
    text: String,
    hash: ContentHash,
}

impl SourceCode {
    /// Create a snapshot from text and a logical path.
    pub fn from_string_and_path(text: impl Into<String>, path: impl Into<String>) -> Self {
        let text = text.into();
        let hash = ContentHash::compute(text.as_bytes());
        SourceCode {
            path: path.into(),
            text,
            hash,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check that an offset addresses this snapshot (`0 <= offset <= len`).
    pub fn contains_offset(&self, offset: ByteOffset) -> bool {
        offset.to_usize() <= self.text.len()
    }

    /// Extract the text of a span, if it lies within bounds on char boundaries.
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.text.get(span.start..span.end)
    }
}
