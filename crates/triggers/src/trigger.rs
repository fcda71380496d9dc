//! Trigger trait and invocation context
//!
//! A trigger binds a path pattern and a lifecycle kind to a handler. The
//! runtime matches every delivered event against the registered triggers and
//! invokes each match with the captured path parameters.
//!
//! Handlers run on worker threads, possibly concurrently with other
//! invocations of the same trigger, and may be invoked more than once for
//! the same logical event (at-least-once delivery). A handler either
//! completes or returns an error; returning an error requests redelivery.

use storyhive_core::{ChangeEvent, ChangeKind, PathParams, PathPattern, Result};
use storyhive_store::DocumentStore;

/// Everything a handler may touch during one invocation
pub struct TriggerContext<'a> {
    /// The store the event originated from
    pub store: &'a DocumentStore,
    /// The event being delivered, including its attempt counter
    pub event: &'a ChangeEvent,
}

/// A handler bound to a path pattern and lifecycle kind
pub trait Trigger: Send + Sync {
    /// Stable handler name, used in logs
    fn name(&self) -> &str;

    /// Which lifecycle transition this trigger reacts to
    fn kind(&self) -> ChangeKind;

    /// Path pattern selecting the documents this trigger watches
    fn pattern(&self) -> &PathPattern;

    /// Handle one delivery of one event
    ///
    /// # Errors
    /// An error requests redelivery of the event, up to the runtime's
    /// redelivery limit.
    fn run(&self, ctx: &TriggerContext<'_>, params: &PathParams) -> Result<()>;
}
