//! Identifier types for storyhive
//!
//! This module defines the foundational identifiers:
//! - UserId: stable unique identifier for a user account
//! - StoryId: identifier for a published story
//!
//! Both are thin string newtypes. Identifiers come from the external identity
//! provider (users) or are minted by the client (stories), so no format beyond
//! "non-empty, no path separator" is assumed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validate an identifier segment: non-empty and free of the path separator.
fn valid_id(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

/// Stable unique identifier for a user account
///
/// UserIds are issued by the identity provider and used as document ids in the
/// `users` collection and as follower-edge document ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a UserId, rejecting empty ids and ids containing '/'
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        valid_id(&id).then_some(Self(id))
    }

    /// Borrow the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a published story
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoryId(String);

impl StoryId {
    /// Create a StoryId, rejecting empty ids and ids containing '/'
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        valid_id(&id).then_some(Self(id))
    }

    /// Borrow the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
