//! Core types and traits for storyhive
//!
//! This crate defines the foundational types used throughout the system:
//! - UserId, StoryId: identifier newtypes
//! - DocPath, CollectionPath: document and collection addressing
//! - PathPattern, PathParams: trigger path patterns with named captures
//! - Value: unified value enum for document fields
//! - Document, FieldOp: stored documents and atomic field mutations
//! - EventId, ChangeKind, ChangeEvent: document lifecycle events
//! - ChangeSink: the store-to-runtime event seam
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod event;
pub mod path;
pub mod pattern;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use document::{now_millis, Document, FieldOp};
pub use error::{Error, Result};
pub use event::{ChangeEvent, ChangeKind, EventId};
pub use path::{CollectionPath, DocPath};
pub use pattern::{PathParams, PathPattern};
pub use traits::{ChangeSink, NullSink};
pub use types::{StoryId, UserId};
pub use value::Value;
