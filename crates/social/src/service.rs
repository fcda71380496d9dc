//! Follow service: the writer side of the follow graph
//!
//! Creates and deletes the `users/{followed}/followers/{follower}` edge
//! documents the counter triggers react to. The service itself never touches
//! a counter; that is the triggers' job.

use crate::schema::{
    self, FIELD_FOLLOWERS_COUNT, FIELD_FOLLOWER_ID, FIELD_FOLLOWING_COUNT,
};
use storyhive_core::{Error, Result, UserId, Value};
use storyhive_store::DocumentStore;

/// Denormalized counter pair read off a user document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowStats {
    /// Inbound edges, as counted by the triggers
    pub followers_count: i64,
    /// Outbound edges, as counted by the triggers
    pub following_count: i64,
}

/// Follow/unfollow operations against the store
#[derive(Clone)]
pub struct FollowService {
    store: DocumentStore,
}

impl FollowService {
    /// Create a service over the given store
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Create the edge "`follower` follows `followed`"
    ///
    /// Returns `true` when the edge came into existence; re-following an
    /// already-followed user rewrites the edge body without firing a second
    /// creation event, and returns `false`.
    ///
    /// # Errors
    /// `Error::InvalidOperation` on self-follow; `Error::DocumentNotFound`
    /// when either user document is missing.
    pub fn follow(&self, follower: &UserId, followed: &UserId) -> Result<bool> {
        if follower == followed {
            return Err(Error::InvalidOperation(
                "users cannot follow themselves".to_string(),
            ));
        }
        self.require_user(follower)?;
        self.require_user(followed)?;

        let edge = schema::follower_edge(followed, follower)?;
        Ok(self.store.set(
            &edge,
            [(
                FIELD_FOLLOWER_ID.to_string(),
                Value::from(follower.as_str()),
            )],
        ))
    }

    /// Delete the edge "`follower` follows `followed`"
    ///
    /// Returns `true` when an edge was removed; unfollowing someone never
    /// followed is a no-op.
    pub fn unfollow(&self, follower: &UserId, followed: &UserId) -> Result<bool> {
        let edge = schema::follower_edge(followed, follower)?;
        Ok(self.store.delete(&edge))
    }

    /// Whether the edge "`follower` follows `followed`" exists
    pub fn is_following(&self, follower: &UserId, followed: &UserId) -> Result<bool> {
        let edge = schema::follower_edge(followed, follower)?;
        Ok(self.store.exists(&edge))
    }

    /// The follower identifiers of a user, from the authoritative edge set
    pub fn followers_of(&self, user: &UserId) -> Result<Vec<UserId>> {
        let collection = schema::user_path(user.as_str())?.sub_collection(schema::FOLLOWERS)?;
        Ok(self
            .store
            .list(&collection)
            .into_iter()
            .filter_map(|(path, _)| UserId::new(path.doc_id()))
            .collect())
    }

    /// The denormalized counter pair on a user document
    ///
    /// # Errors
    /// `Error::DocumentNotFound` when the user document is missing.
    pub fn stats(&self, user: &UserId) -> Result<FollowStats> {
        let path = schema::user_path(user.as_str())?;
        let doc = self
            .store
            .get(&path)
            .ok_or(Error::DocumentNotFound(path))?;
        Ok(FollowStats {
            followers_count: doc.int_field(FIELD_FOLLOWERS_COUNT)?,
            following_count: doc.int_field(FIELD_FOLLOWING_COUNT)?,
        })
    }

    fn require_user(&self, user: &UserId) -> Result<()> {
        let path = schema::user_path(user.as_str())?;
        if !self.store.exists(&path) {
            return Err(Error::DocumentNotFound(path));
        }
        Ok(())
    }
}
