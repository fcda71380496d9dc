//! Follow-edge counter triggers
//!
//! Two handlers keep the denormalized `followersCount` / `followingCount`
//! fields on user documents in step with the set of follow edges:
//!
//! - [`OnFollowCreated`] reacts to `users/{userId}/followers/{followerId}`
//!   creation: `followingCount` +1 on the follower, `followersCount` +1 on
//!   the followed user.
//! - [`OnFollowDeleted`] reacts to edge deletion with the symmetric
//!   decrements.
//!
//! ## Consistency model
//!
//! In [`CounterMode::Delta`] each handler performs two independent atomic
//! field increments on two documents, in sequence, with no common commit
//! point. Concurrent handlers never lose a delta to each other (the store
//! serializes increments per field), but a crash between the two updates
//! leaves the pair diverged, and a redelivered event applies its delta
//! twice. Both gaps are inherited from the delta design; see
//! [`crate::reconcile`] for the repair path.
//!
//! In [`CounterMode::Deduplicated`] the handler runs one transaction that
//! records a processed-event marker under `counter_ledger/{eventId}` next to
//! both deltas. A redelivered event finds its marker and applies nothing,
//! and the two counters move together or not at all.

use crate::schema::{
    self, FIELD_FOLLOWERS_COUNT, FIELD_FOLLOWING_COUNT,
};
use once_cell::sync::Lazy;
use storyhive_core::{
    now_millis, ChangeKind, FieldOp, PathParams, PathPattern, Result, Value,
};
use storyhive_triggers::{Trigger, TriggerContext};
use tracing::info;

/// Pattern both follow triggers register on
pub const FOLLOW_EDGE_PATTERN: &str = "users/{userId}/followers/{followerId}";

static EDGE_PATTERN: Lazy<PathPattern> =
    Lazy::new(|| PathPattern::parse(FOLLOW_EDGE_PATTERN).expect("follow edge pattern is valid"));

/// How counter deltas are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterMode {
    /// Two independent atomic increments per event, no redelivery
    /// protection. Matches the observed production behavior.
    #[default]
    Delta,
    /// One transaction per event with a processed-event marker: idempotent
    /// under redelivery, counters move as a pair.
    Deduplicated,
}

/// Configuration for the follow counter triggers
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterConfig {
    /// Delta application mode
    pub mode: CounterMode,
}

impl CounterConfig {
    /// Default config: plain delta application
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent, transactional delta application
    pub fn deduplicated() -> Self {
        Self {
            mode: CounterMode::Deduplicated,
        }
    }
}

/// Apply one signed delta to both counters of a follow edge
///
/// `delta` is +1 for an edge creation and -1 for a deletion. The follower's
/// `followingCount` moves first, then the followed user's `followersCount`,
/// mirroring the order counters have always been applied in.
fn apply_delta(
    ctx: &TriggerContext<'_>,
    user_id: &str,
    follower_id: &str,
    delta: i64,
    mode: CounterMode,
) -> Result<()> {
    let follower_ref = schema::user_path(follower_id)?;
    let user_ref = schema::user_path(user_id)?;

    match mode {
        CounterMode::Delta => {
            ctx.store
                .increment(&follower_ref, FIELD_FOLLOWING_COUNT, delta)?;
            ctx.store
                .increment(&user_ref, FIELD_FOLLOWERS_COUNT, delta)?;
            Ok(())
        }
        CounterMode::Deduplicated => {
            let marker = schema::ledger_path(&ctx.event.id.to_string())?;
            ctx.store.transaction(|txn| {
                if txn.exists(&marker) {
                    // Same event seen before; the deltas are already in
                    return Ok(());
                }
                txn.set(
                    &marker,
                    [
                        ("appliedAt".to_string(), Value::Int(now_millis())),
                        ("delta".to_string(), Value::Int(delta)),
                    ],
                );
                txn.update(
                    &follower_ref,
                    &[(FIELD_FOLLOWING_COUNT, FieldOp::Increment(delta))],
                )?;
                txn.update(
                    &user_ref,
                    &[(FIELD_FOLLOWERS_COUNT, FieldOp::Increment(delta))],
                )?;
                Ok(())
            })
        }
    }
}

/// Trigger: a follow edge came into existence
pub struct OnFollowCreated {
    config: CounterConfig,
}

impl OnFollowCreated {
    /// Build the creation-side trigger
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }
}

impl Trigger for OnFollowCreated {
    fn name(&self) -> &str {
        "on_follow_user"
    }

    fn kind(&self) -> ChangeKind {
        ChangeKind::Created
    }

    fn pattern(&self) -> &PathPattern {
        &EDGE_PATTERN
    }

    fn run(&self, ctx: &TriggerContext<'_>, params: &PathParams) -> Result<()> {
        let user_id = params.require("userId")?;
        let follower_id = params.require("followerId")?;
        info!("User {} started following {}", follower_id, user_id);
        apply_delta(ctx, user_id, follower_id, 1, self.config.mode)
    }
}

/// Trigger: a follow edge was removed
pub struct OnFollowDeleted {
    config: CounterConfig,
}

impl OnFollowDeleted {
    /// Build the deletion-side trigger
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }
}

impl Trigger for OnFollowDeleted {
    fn name(&self) -> &str {
        "on_unfollow_user"
    }

    fn kind(&self) -> ChangeKind {
        ChangeKind::Deleted
    }

    fn pattern(&self) -> &PathPattern {
        &EDGE_PATTERN
    }

    fn run(&self, ctx: &TriggerContext<'_>, params: &PathParams) -> Result<()> {
        let user_id = params.require("userId")?;
        let follower_id = params.require("followerId")?;
        info!("User {} unfollowed {}", follower_id, user_id);
        apply_delta(ctx, user_id, follower_id, -1, self.config.mode)
    }
}
