//! Story engagement: likes, saves, ratings, comments
//!
//! Like-toggles move a counter on the story document and a list on the user
//! document together, so they run as one transaction. Saves touch only the
//! user document but still read-then-write, so they take the same path.
//! Ratings and comments are plain sub-document writes.

use crate::schema::{
    self, FIELD_COMMENT_AUTHOR_ID, FIELD_COMMENT_AUTHOR_NAME, FIELD_CREATED_AT,
    FIELD_LIKED_STORIES, FIELD_LIKES, FIELD_RATING_VALUE, FIELD_SAVED_STORIES, FIELD_TEXT,
};
use storyhive_core::{
    now_millis, DocPath, Document, Error, FieldOp, Result, StoryId, UserId, Value,
};
use storyhive_store::DocumentStore;
use uuid::Uuid;

/// One comment, as read back from a story's comment sub-collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment document id
    pub id: String,
    /// Author's user id
    pub author_id: String,
    /// Author's display name at post time
    pub author_name: String,
    /// Comment body
    pub text: String,
    /// Post time, epoch millis
    pub created_at: i64,
}

impl Comment {
    fn from_document(id: &str, doc: &Document) -> Option<Self> {
        Some(Self {
            id: id.to_string(),
            author_id: doc.field(FIELD_COMMENT_AUTHOR_ID)?.as_str()?.to_string(),
            author_name: doc.field(FIELD_COMMENT_AUTHOR_NAME)?.as_str()?.to_string(),
            text: doc.field(FIELD_TEXT)?.as_str()?.to_string(),
            created_at: doc.field(FIELD_CREATED_AT)?.as_int()?,
        })
    }
}

/// Engagement operations against the store
#[derive(Clone)]
pub struct EngagementService {
    store: DocumentStore,
}

impl EngagementService {
    /// Create a service over the given store
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Toggle `user`'s like on `story`; returns the new liked state
    ///
    /// One transaction moves the story's `likes` count and the user's
    /// `likedStories` list together.
    ///
    /// # Errors
    /// `Error::DocumentNotFound` when the story or user document is missing.
    pub fn toggle_like(&self, user: &UserId, story: &StoryId) -> Result<bool> {
        let story_ref = schema::story_path(story.as_str())?;
        let user_ref = schema::user_path(user.as_str())?;
        let story_value = Value::from(story.as_str());

        self.store.transaction(|txn| {
            let user_doc = txn
                .get(&user_ref)
                .ok_or_else(|| Error::DocumentNotFound(user_ref.clone()))?;
            if !txn.exists(&story_ref) {
                return Err(Error::DocumentNotFound(story_ref.clone()));
            }

            let liked = user_doc
                .field(FIELD_LIKED_STORIES)
                .and_then(Value::as_array)
                .map(|items| items.contains(&story_value))
                .unwrap_or(false);

            if liked {
                txn.update(&story_ref, &[(FIELD_LIKES, FieldOp::Increment(-1))])?;
                txn.update(
                    &user_ref,
                    &[(FIELD_LIKED_STORIES, FieldOp::ArrayRemove(story_value.clone()))],
                )?;
            } else {
                txn.update(&story_ref, &[(FIELD_LIKES, FieldOp::Increment(1))])?;
                txn.update(
                    &user_ref,
                    &[(FIELD_LIKED_STORIES, FieldOp::ArrayUnion(story_value.clone()))],
                )?;
            }
            Ok(!liked)
        })
    }

    /// Toggle `story` in `user`'s saved list; returns the new saved state
    pub fn toggle_save(&self, user: &UserId, story: &StoryId) -> Result<bool> {
        let user_ref = schema::user_path(user.as_str())?;
        let story_value = Value::from(story.as_str());

        self.store.transaction(|txn| {
            let user_doc = txn
                .get(&user_ref)
                .ok_or_else(|| Error::DocumentNotFound(user_ref.clone()))?;
            let saved = user_doc
                .field(FIELD_SAVED_STORIES)
                .and_then(Value::as_array)
                .map(|items| items.contains(&story_value))
                .unwrap_or(false);

            let op = if saved {
                FieldOp::ArrayRemove(story_value.clone())
            } else {
                FieldOp::ArrayUnion(story_value.clone())
            };
            txn.update(&user_ref, &[(FIELD_SAVED_STORIES, op)])?;
            Ok(!saved)
        })
    }

    /// Record `user`'s star rating of `story`, replacing any earlier rating
    ///
    /// # Errors
    /// `Error::InvalidOperation` for values outside 1..=5;
    /// `Error::DocumentNotFound` when the story is missing.
    pub fn rate(&self, user: &UserId, story: &StoryId, value: i64) -> Result<()> {
        if !(1..=5).contains(&value) {
            return Err(Error::InvalidOperation(format!(
                "rating must be between 1 and 5, got {}",
                value
            )));
        }
        let story_ref = schema::story_path(story.as_str())?;
        if !self.store.exists(&story_ref) {
            return Err(Error::DocumentNotFound(story_ref));
        }
        let rating_ref = story_ref
            .sub_collection(schema::RATINGS)?
            .doc(user.as_str())?;
        self.store.set(
            &rating_ref,
            [(FIELD_RATING_VALUE.to_string(), Value::Int(value))],
        );
        Ok(())
    }

    /// Mean of all ratings on `story`, if any exist
    pub fn average_rating(&self, story: &StoryId) -> Result<Option<f64>> {
        let ratings = schema::story_path(story.as_str())?.sub_collection(schema::RATINGS)?;
        let values: Vec<i64> = self
            .store
            .list(&ratings)
            .iter()
            .filter_map(|(_, doc)| doc.field(FIELD_RATING_VALUE)?.as_int())
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            values.iter().sum::<i64>() as f64 / values.len() as f64,
        ))
    }

    /// Append a comment to `story`; returns the comment document's path
    ///
    /// # Errors
    /// `Error::InvalidOperation` for blank text; `Error::DocumentNotFound`
    /// when the story is missing.
    pub fn add_comment(
        &self,
        user: &UserId,
        author_name: &str,
        story: &StoryId,
        text: &str,
    ) -> Result<DocPath> {
        if text.trim().is_empty() {
            return Err(Error::InvalidOperation(
                "comment cannot be empty".to_string(),
            ));
        }
        let story_ref = schema::story_path(story.as_str())?;
        if !self.store.exists(&story_ref) {
            return Err(Error::DocumentNotFound(story_ref));
        }

        let comment_ref = story_ref
            .sub_collection(schema::COMMENTS)?
            .doc(&Uuid::new_v4().to_string())?;
        self.store.set(
            &comment_ref,
            [
                (FIELD_TEXT.to_string(), Value::from(text)),
                (
                    FIELD_COMMENT_AUTHOR_ID.to_string(),
                    Value::from(user.as_str()),
                ),
                (
                    FIELD_COMMENT_AUTHOR_NAME.to_string(),
                    Value::from(author_name),
                ),
                (FIELD_CREATED_AT.to_string(), Value::Int(now_millis())),
            ],
        );
        Ok(comment_ref)
    }

    /// All comments on `story`, newest first
    pub fn comments(&self, story: &StoryId) -> Result<Vec<Comment>> {
        let collection = schema::story_path(story.as_str())?.sub_collection(schema::COMMENTS)?;
        let mut comments: Vec<Comment> = self
            .store
            .list(&collection)
            .iter()
            .filter_map(|(path, doc)| Comment::from_document(path.doc_id(), doc))
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}
