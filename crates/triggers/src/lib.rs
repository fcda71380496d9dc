//! Trigger runtime for storyhive
//!
//! Connects a [`DocumentStore`] to handler functions: the store publishes a
//! change event for every document create/delete, and this crate's worker
//! pool matches each event against registered path patterns and invokes the
//! matching handlers.
//!
//! ## Delivery model
//!
//! At-least-once, unordered. Handlers must tolerate redelivery of the same
//! event (same id, higher attempt) and concurrent invocations. See
//! [`runtime::TriggerRuntime`] for the mechanics.
//!
//! [`DocumentStore`]: storyhive_store::DocumentStore

#![warn(clippy::all)]

pub mod config;
pub mod runtime;
pub mod trigger;

pub use config::DeliveryConfig;
pub use runtime::{RuntimeStats, TriggerRuntime};
pub use trigger::{Trigger, TriggerContext};
