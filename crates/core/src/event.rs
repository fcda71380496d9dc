//! Change events
//!
//! The store publishes one `ChangeEvent` per document lifecycle transition
//! (create or delete). Delivery to trigger handlers is at-least-once: the same
//! event may be handed to a handler more than once, with the same `EventId`
//! and a bumped attempt counter. Handlers that need exactly-once effects must
//! deduplicate on the id themselves.

use crate::document::now_millis;
use crate::path::DocPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one logical change event
///
/// Stable across redeliveries: every delivery attempt of the same underlying
/// mutation carries the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Mint a fresh event id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document lifecycle transition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Document came into existence
    Created,
    /// Document was removed
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// One document lifecycle event as delivered to triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Logical event identity, stable across redeliveries
    pub id: EventId,
    /// Path of the created or deleted document
    pub path: DocPath,
    /// Which transition happened
    pub kind: ChangeKind,
    /// Delivery attempt, 0 for the first delivery
    pub attempt: u32,
    /// When the mutation occurred, epoch millis
    pub occurred_at: i64,
}

impl ChangeEvent {
    /// Build a first-attempt event for a mutation happening now
    pub fn new(path: DocPath, kind: ChangeKind) -> Self {
        Self {
            id: EventId::new(),
            path,
            kind,
            attempt: 0,
            occurred_at: now_millis(),
        }
    }

    /// The same logical event, one attempt later
    pub fn redelivery(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}
