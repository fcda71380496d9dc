//! Storyhive - embedded backend for a social storytelling application
//!
//! Users publish stories, follow authors, and like/save/rate/comment on what
//! they read. Documents live in an in-memory store; follower/following
//! counts are denormalized onto user documents and maintained by a pair of
//! change triggers reacting to follow-edge creation and deletion.
//!
//! # Quick Start
//!
//! ```
//! use storyhive::{Storyhive, UserId};
//!
//! let hive = Storyhive::ephemeral();
//! let alice = UserId::new("alice").unwrap();
//! let bob = UserId::new("bob").unwrap();
//! hive.create_user(&alice, "alice", "alice@example.com").unwrap();
//! hive.create_user(&bob, "bob", "bob@example.com").unwrap();
//!
//! hive.follows().follow(&bob, &alice).unwrap();
//! hive.drain();
//!
//! let stats = hive.follows().stats(&alice).unwrap();
//! assert_eq!(stats.followers_count, 1);
//! # hive.shutdown();
//! ```
//!
//! # Architecture
//!
//! - [`storyhive_store::DocumentStore`]: sharded in-memory documents with
//!   atomic per-document field operations and change-event emission
//! - [`storyhive_triggers::TriggerRuntime`]: worker pool delivering events
//!   to pattern-matched handlers, at-least-once with redelivery
//! - [`storyhive_social`]: the follow counter triggers, follow/engagement
//!   services, and the reconciliation sweep
//! - [`Storyhive`]: the facade wiring the pieces together

mod hive;

pub use hive::{Storyhive, StoryhiveConfig};

// Re-export the types callers touch day to day
pub use storyhive_core::{
    ChangeEvent, ChangeKind, CollectionPath, DocPath, Document, Error, EventId, FieldOp,
    Result, StoryId, UserId, Value,
};
pub use storyhive_social::{
    Comment, CounterConfig, CounterMode, EngagementService, FollowService, FollowStats,
    ReconcileReport, Role,
};
pub use storyhive_store::{DocumentStore, StoreStats};
pub use storyhive_triggers::{DeliveryConfig, RuntimeStats, Trigger, TriggerContext, TriggerRuntime};
