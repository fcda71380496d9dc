//! Counter reconciliation
//!
//! The delta-based triggers can leave counters drifted: a crash between the
//! two updates of one event, or a redelivered event, changes a counter
//! without a matching change to the edge set. Reconciliation recomputes both
//! counters for every user from the authoritative edges and rewrites the
//! fields that disagree.
//!
//! This is a maintenance sweep, not a consistency mechanism: it repairs
//! drift after the fact and reports what it found.

use crate::schema::{self, FIELD_FOLLOWERS_COUNT, FIELD_FOLLOWING_COUNT};
use rustc_hash::FxHashMap;
use storyhive_core::{CollectionPath, FieldOp, Result, Value};
use storyhive_store::DocumentStore;
use tracing::{info, warn};

/// One counter field found out of step with the edge set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterDrift {
    /// User document id
    pub uid: String,
    /// Which counter field drifted
    pub field: &'static str,
    /// Value stored on the document
    pub stored: i64,
    /// Value recomputed from the edges
    pub expected: i64,
}

/// Outcome of one reconciliation sweep
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// User documents examined
    pub users_scanned: usize,
    /// Follow edges examined
    pub edges_scanned: usize,
    /// Drifts found (all repaired unless the user document vanished mid-sweep)
    pub drifts: Vec<CounterDrift>,
}

/// Recompute both counters for every user and repair drifted fields
///
/// Edges whose follower no longer has a user document still count toward the
/// followed user's inbound total; they are the followed user's problem to
/// display, not ours to hide.
pub fn reconcile_counters(store: &DocumentStore) -> Result<ReconcileReport> {
    let users = CollectionPath::parse(schema::USERS)?;
    let user_docs = store.list(&users);

    let mut inbound: FxHashMap<String, i64> = FxHashMap::default();
    let mut outbound: FxHashMap<String, i64> = FxHashMap::default();
    let mut report = ReconcileReport {
        users_scanned: user_docs.len(),
        ..Default::default()
    };

    for (user_path, _) in &user_docs {
        let followers = user_path.sub_collection(schema::FOLLOWERS)?;
        for (edge_path, _) in store.list(&followers) {
            report.edges_scanned += 1;
            *inbound.entry(user_path.doc_id().to_string()).or_default() += 1;
            *outbound.entry(edge_path.doc_id().to_string()).or_default() += 1;
        }
    }

    for (user_path, doc) in &user_docs {
        let uid = user_path.doc_id();
        let checks = [
            (
                FIELD_FOLLOWERS_COUNT,
                inbound.get(uid).copied().unwrap_or(0),
            ),
            (
                FIELD_FOLLOWING_COUNT,
                outbound.get(uid).copied().unwrap_or(0),
            ),
        ];
        for (field, expected) in checks {
            let stored = doc.int_field(field)?;
            if stored == expected {
                continue;
            }
            report.drifts.push(CounterDrift {
                uid: uid.to_string(),
                field,
                stored,
                expected,
            });
            match store.update(user_path, &[(field, FieldOp::Set(Value::Int(expected)))]) {
                Ok(()) => {}
                Err(e) => warn!(uid, field, "drift repair failed: {}", e),
            }
        }
    }

    info!(
        users = report.users_scanned,
        edges = report.edges_scanned,
        drifts = report.drifts.len(),
        "counter reconciliation complete"
    );
    Ok(report)
}
