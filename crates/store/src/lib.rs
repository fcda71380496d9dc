//! In-memory document store for storyhive
//!
//! ## Design
//!
//! - Documents live in a DashMap keyed by full [`DocPath`]; reads are
//!   lock-free, writes lock only the target shard.
//! - Single-document field operations are atomic: they run under the
//!   document's shard entry and either fully apply or fully fail.
//! - Create and delete transitions publish [`ChangeEvent`]s to an attached
//!   [`ChangeSink`]. Updates are silent.
//! - Multi-document transactions buffer writes and replay them under a
//!   store-wide commit lock, all-or-nothing.
//!
//! [`DocPath`]: storyhive_core::DocPath
//! [`ChangeEvent`]: storyhive_core::ChangeEvent
//! [`ChangeSink`]: storyhive_core::ChangeSink

#![warn(clippy::all)]

pub mod store;
pub mod transaction;

pub use store::{DocumentStore, StoreStats};
pub use transaction::TransactionContext;
