//! Social graph and engagement layer for storyhive
//!
//! The pieces, bottom up:
//!
//! - [`schema`]: collection layout, field names, document builders
//! - [`follow`]: the counter-maintenance trigger pair reacting to follow
//!   edge creation and deletion
//! - [`service`]: the writer side of the follow graph (edge create/delete)
//! - [`engagement`]: likes, saves, ratings, comments
//! - [`reconcile`]: recompute-and-repair sweep for drifted counters
//!
//! The triggers in [`follow`] are the consistency-critical part: they keep
//! two denormalized counters on two different user documents in step with
//! the edge set under at-least-once, unordered event delivery.

#![warn(clippy::all)]

pub mod engagement;
pub mod follow;
pub mod reconcile;
pub mod schema;
pub mod service;

pub use engagement::{Comment, EngagementService};
pub use follow::{
    CounterConfig, CounterMode, OnFollowCreated, OnFollowDeleted, FOLLOW_EDGE_PATTERN,
};
pub use reconcile::{reconcile_counters, CounterDrift, ReconcileReport};
pub use schema::Role;
pub use service::{FollowService, FollowStats};
