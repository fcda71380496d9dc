//! Document and collection addressing
//!
//! The store is organized as top-level collections of documents, where any
//! document may own nested sub-collections:
//!
//! - Document path: alternating collection/document segments, even count.
//!   `users/u1`, `users/u1/followers/u2`, `stories/s1/comments/c1`
//! - Collection path: odd segment count, ends on a collection.
//!   `users`, `stories/s1/ratings`
//!
//! Paths are the only addressing scheme in the system. They are validated at
//! parse time so downstream code never sees empty or misaligned segments.
//! `DocPath` ordering is lexicographic over segments, which makes collection
//! scans deterministic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

fn split_segments(raw: &str) -> Result<Vec<String>> {
    let segments: Vec<String> = raw.split('/').map(str::to_string).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::InvalidPath(format!("empty segment in '{}'", raw)));
    }
    Ok(segments)
}

// =============================================================================
// DocPath
// =============================================================================

/// Address of a single document
///
/// Segments alternate collection / document id, so the count is always even
/// and at least 2.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// Parse a document path from its slash-separated form
    ///
    /// # Errors
    /// Returns `Error::InvalidPath` if any segment is empty or the segment
    /// count is odd or zero.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments = split_segments(raw)?;
        if segments.len() < 2 || segments.len() % 2 != 0 {
            return Err(Error::InvalidPath(format!(
                "document path needs an even number of segments: '{}'",
                raw
            )));
        }
        Ok(Self { segments })
    }

    /// Build the path of a document directly inside a collection
    pub fn in_collection(collection: &CollectionPath, doc_id: &str) -> Result<Self> {
        if doc_id.is_empty() || doc_id.contains('/') {
            return Err(Error::InvalidPath(format!("invalid document id '{}'", doc_id)));
        }
        let mut segments = collection.segments().to_vec();
        segments.push(doc_id.to_string());
        Ok(Self { segments })
    }

    /// Name of the collection this document sits in (the last collection segment)
    pub fn collection(&self) -> &str {
        &self.segments[self.segments.len() - 2]
    }

    /// Document id (the last segment)
    pub fn doc_id(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Path of a sub-collection owned by this document
    pub fn sub_collection(&self, name: &str) -> Result<CollectionPath> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::InvalidPath(format!("invalid collection name '{}'", name)));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(CollectionPath { segments })
    }

    /// Document owning this one's collection, if any
    ///
    /// `users/u1/followers/u2` -> `users/u1`; top-level documents return None.
    pub fn parent(&self) -> Option<DocPath> {
        if self.segments.len() <= 2 {
            return None;
        }
        Some(DocPath {
            segments: self.segments[..self.segments.len() - 2].to_vec(),
        })
    }

    /// True for documents in a top-level collection
    pub fn is_top_level(&self) -> bool {
        self.segments.len() == 2
    }

    /// Raw segments, alternating collection / document id
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

// =============================================================================
// CollectionPath
// =============================================================================

/// Address of a collection or sub-collection
///
/// Odd segment count: a bare collection name, or a document path followed by a
/// sub-collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Parse a collection path from its slash-separated form
    ///
    /// # Errors
    /// Returns `Error::InvalidPath` if any segment is empty or the segment
    /// count is even.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 1 {
            return Err(Error::InvalidPath(format!(
                "collection path needs an odd number of segments: '{}'",
                raw
            )));
        }
        Ok(Self { segments })
    }

    /// Path of a document directly inside this collection
    pub fn doc(&self, doc_id: &str) -> Result<DocPath> {
        DocPath::in_collection(self, doc_id)
    }

    /// Collection name (the last segment)
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// True if `doc` is a direct member of this collection
    ///
    /// Documents in nested sub-collections are not direct members.
    pub fn contains(&self, doc: &DocPath) -> bool {
        doc.segments().len() == self.segments.len() + 1
            && doc.segments()[..self.segments.len()] == self.segments[..]
    }

    /// Raw segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
