//! Collection and field layout
//!
//! One place for every collection name, field name, and path shape the
//! social layer touches:
//!
//! ```text
//! users/{uid}                          profile + denormalized counters
//! users/{uid}/followers/{followerId}   follow edge (existence is the signal)
//! stories/{id}                         story body + likes counter
//! stories/{id}/comments/{commentId}    comment
//! stories/{id}/ratings/{uid}           one rating per user
//! counter_ledger/{eventId}             processed-event markers (dedup mode)
//! ```

use storyhive_core::{DocPath, Result, StoryId, UserId, Value};

/// Top-level user collection
pub const USERS: &str = "users";
/// Top-level story collection
pub const STORIES: &str = "stories";
/// Follow-edge sub-collection under a user
pub const FOLLOWERS: &str = "followers";
/// Comment sub-collection under a story
pub const COMMENTS: &str = "comments";
/// Rating sub-collection under a story
pub const RATINGS: &str = "ratings";
/// Processed-event marker collection used by the deduplicating counter mode
pub const COUNTER_LEDGER: &str = "counter_ledger";

/// Denormalized inbound-edge count on a user document
pub const FIELD_FOLLOWERS_COUNT: &str = "followersCount";
/// Denormalized outbound-edge count on a user document
pub const FIELD_FOLLOWING_COUNT: &str = "followingCount";
/// Edge body field naming the follower
pub const FIELD_FOLLOWER_ID: &str = "followerId";

/// User document fields
pub const FIELD_UID: &str = "uid";
/// Display name chosen at sign-up
pub const FIELD_USERNAME: &str = "username";
/// Account email
pub const FIELD_EMAIL: &str = "email";
/// Account role, see [`Role`]
pub const FIELD_ROLE: &str = "role";
/// Profile bio
pub const FIELD_BIO: &str = "bio";
/// Avatar URL
pub const FIELD_PHOTO_URL: &str = "photoURL";
/// Story ids the user saved for later
pub const FIELD_SAVED_STORIES: &str = "savedStories";
/// Story ids the user liked
pub const FIELD_LIKED_STORIES: &str = "likedStories";

/// Story document fields
pub const FIELD_TITLE: &str = "title";
/// Author's user id
pub const FIELD_AUTHOR_ID: &str = "authorId";
/// Cover image URL
pub const FIELD_THUMBNAIL_URL: &str = "thumbnailUrl";
/// Story body text
pub const FIELD_CONTENT: &str = "content";
/// Denormalized like count
pub const FIELD_LIKES: &str = "likes";

/// Comment fields
pub const FIELD_TEXT: &str = "text";
/// Comment author's user id
pub const FIELD_COMMENT_AUTHOR_ID: &str = "authorId";
/// Comment author's display name at post time
pub const FIELD_COMMENT_AUTHOR_NAME: &str = "authorName";
/// Comment creation time, epoch millis
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Rating field
pub const FIELD_RATING_VALUE: &str = "value";

/// Account role
///
/// Everyone signs up as a reader; authors are promoted out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Can read, follow, like, save, rate, comment
    Reader,
    /// Additionally publishes stories
    Author,
}

impl Role {
    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Author => "author",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reader" => Some(Role::Reader),
            "author" => Some(Role::Author),
            _ => None,
        }
    }
}

// =============================================================================
// Path builders
// =============================================================================

/// Path of a user document
pub fn user_path(uid: &str) -> Result<DocPath> {
    DocPath::parse(&format!("{}/{}", USERS, uid))
}

/// Path of a story document
pub fn story_path(id: &str) -> Result<DocPath> {
    DocPath::parse(&format!("{}/{}", STORIES, id))
}

/// Path of the follow edge "`follower` follows `followed`"
pub fn follower_edge(followed: &UserId, follower: &UserId) -> Result<DocPath> {
    DocPath::parse(&format!(
        "{}/{}/{}/{}",
        USERS, followed, FOLLOWERS, follower
    ))
}

/// Path of a processed-event marker
pub fn ledger_path(event_id: &str) -> Result<DocPath> {
    DocPath::parse(&format!("{}/{}", COUNTER_LEDGER, event_id))
}

// =============================================================================
// Document builders
// =============================================================================

/// Fields of a fresh user document, as written at sign-up
///
/// Counters start at zero; saved/liked lists start absent and are created on
/// first use.
pub fn new_user_fields(uid: &UserId, username: &str, email: &str) -> Vec<(String, Value)> {
    vec![
        (FIELD_UID.to_string(), Value::from(uid.as_str())),
        (FIELD_USERNAME.to_string(), Value::from(username)),
        (FIELD_EMAIL.to_string(), Value::from(email)),
        (FIELD_ROLE.to_string(), Value::from(Role::Reader.as_str())),
        (FIELD_FOLLOWERS_COUNT.to_string(), Value::Int(0)),
        (FIELD_FOLLOWING_COUNT.to_string(), Value::Int(0)),
    ]
}

/// Fields of a fresh story document
pub fn new_story_fields(
    author: &UserId,
    title: &str,
    content: &str,
    thumbnail_url: Option<&str>,
) -> Vec<(String, Value)> {
    let mut fields = vec![
        (FIELD_AUTHOR_ID.to_string(), Value::from(author.as_str())),
        (FIELD_TITLE.to_string(), Value::from(title)),
        (FIELD_CONTENT.to_string(), Value::from(content)),
        (FIELD_LIKES.to_string(), Value::Int(0)),
    ];
    if let Some(url) = thumbnail_url {
        fields.push((FIELD_THUMBNAIL_URL.to_string(), Value::from(url)));
    }
    fields
}
