//! Sharded in-memory document store
//!
//! Documents live in a DashMap keyed by full path. DashMap gives lock-free
//! reads and sharded writes; every mutation of a single document happens under
//! its shard entry, so per-document field operations are atomic and two
//! concurrent increments of the same field never lose a delta.
//!
//! # Change emission
//!
//! Create and delete transitions publish a [`ChangeEvent`] to the attached
//! [`ChangeSink`] after the mutation is visible. Updates do not publish:
//! the existence of a document is the signal, not its content.
//!
//! # What is NOT guaranteed
//!
//! Cross-document consistency. Two documents mutated by two calls (or by one
//! trigger handler making two calls) are two independent atomic steps with no
//! common commit point. The transaction facility in [`crate::transaction`] is
//! the tool for callers that need the pair to move together.

use crate::transaction::TransactionContext;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storyhive_core::{
    ChangeEvent, ChangeKind, ChangeSink, CollectionPath, DocPath, Document, Error, FieldOp,
    Result, Value,
};
use tracing::debug;

/// Store metrics snapshot
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    /// Documents created since the store was opened
    pub docs_created: u64,
    /// Documents deleted since the store was opened
    pub docs_deleted: u64,
    /// Individual field operations applied
    pub field_ops: u64,
    /// Transactions committed
    pub txns_committed: u64,
    /// Transactions aborted
    pub txns_aborted: u64,
}

struct StoreInner {
    docs: DashMap<DocPath, Document>,
    sink: parking_lot::RwLock<Option<Arc<dyn ChangeSink>>>,
    /// Serializes transactions; single-document operations do not take it
    commit_lock: parking_lot::Mutex<()>,
    docs_created: AtomicU64,
    docs_deleted: AtomicU64,
    field_ops: AtomicU64,
    txns_committed: AtomicU64,
    txns_aborted: AtomicU64,
}

impl StoreInner {
    fn emit(&self, event: ChangeEvent) {
        if let Some(sink) = self.sink.read().as_ref() {
            sink.publish(event);
        }
    }
}

/// In-memory document store with atomic per-document operations
///
/// Cheap to clone; clones share the same underlying data.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create an empty store with no sink attached
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                docs: DashMap::new(),
                sink: parking_lot::RwLock::new(None),
                commit_lock: parking_lot::Mutex::new(()),
                docs_created: AtomicU64::new(0),
                docs_deleted: AtomicU64::new(0),
                field_ops: AtomicU64::new(0),
                txns_committed: AtomicU64::new(0),
                txns_aborted: AtomicU64::new(0),
            }),
        }
    }

    /// Attach the consumer of create/delete events
    ///
    /// Replaces any previously attached sink. Events produced before a sink
    /// is attached are dropped.
    pub fn attach_sink(&self, sink: Arc<dyn ChangeSink>) {
        *self.inner.sink.write() = Some(sink);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the document at `path`
    pub fn get(&self, path: &DocPath) -> Option<Document> {
        self.inner.docs.get(path).map(|entry| entry.clone())
    }

    /// Whether a document exists at `path`
    pub fn exists(&self, path: &DocPath) -> bool {
        self.inner.docs.contains_key(path)
    }

    /// Snapshot of one field of the document at `path`
    pub fn get_field(&self, path: &DocPath, field: &str) -> Option<Value> {
        self.inner
            .docs
            .get(path)
            .and_then(|entry| entry.field(field).cloned())
    }

    /// Snapshot of a collection's direct members, path-ordered
    pub fn list(&self, collection: &CollectionPath) -> Vec<(DocPath, Document)> {
        let mut members: Vec<(DocPath, Document)> = self
            .inner
            .docs
            .iter()
            .filter(|entry| collection.contains(entry.key()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        members.sort_by(|(a, _), (b, _)| a.cmp(b));
        members
    }

    /// Number of direct members of a collection
    pub fn count(&self, collection: &CollectionPath) -> usize {
        self.inner
            .docs
            .iter()
            .filter(|entry| collection.contains(entry.key()))
            .count()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write the document at `path`, creating it if absent
    ///
    /// Returns `true` when the document came into existence, in which case a
    /// `Created` event is published. Writing over an existing document
    /// replaces its fields and publishes nothing: document identity, not
    /// content, drives the event stream.
    pub fn set(
        &self,
        path: &DocPath,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> bool {
        let mut created = false;
        {
            let mut entry = self
                .inner
                .docs
                .entry(path.clone())
                .or_insert_with(|| {
                    created = true;
                    Document::new([])
                });
            entry.fields = fields.into_iter().collect();
            if !created {
                entry.touch();
            }
        }
        if created {
            self.inner.docs_created.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path, "document created");
            self.inner
                .emit(ChangeEvent::new(path.clone(), ChangeKind::Created));
        }
        created
    }

    /// Apply field operations to the document at `path`, atomically
    ///
    /// All ops apply together or none do. The mutation happens under the
    /// document's shard entry, serializing against every other writer of the
    /// same document.
    ///
    /// # Errors
    /// `Error::DocumentNotFound` when no document exists at `path`;
    /// `Error::FieldTypeMismatch` when an op does not fit the stored type.
    pub fn update(&self, path: &DocPath, ops: &[(&str, FieldOp)]) -> Result<()> {
        let mut entry = self
            .inner
            .docs
            .get_mut(path)
            .ok_or_else(|| Error::DocumentNotFound(path.clone()))?;

        // Stage on a copy so a failing op leaves the document untouched
        let mut staged = entry.value().clone();
        for (field, op) in ops {
            staged.apply(field, op)?;
        }
        staged.touch();
        *entry.value_mut() = staged;

        self.inner
            .field_ops
            .fetch_add(ops.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Atomically add `delta` to an integer field
    ///
    /// The add-N primitive: concurrent increments serialize at the shard
    /// entry, so none is lost. A missing field starts from 0.
    ///
    /// # Errors
    /// `Error::DocumentNotFound` when no document exists at `path`;
    /// `Error::FieldTypeMismatch` when the field is not an Int.
    pub fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<i64> {
        let mut entry = self
            .inner
            .docs
            .get_mut(path)
            .ok_or_else(|| Error::DocumentNotFound(path.clone()))?;
        let current = entry.int_field(field)?;
        let next = current + delta;
        entry
            .fields
            .insert(field.to_string(), Value::Int(next));
        entry.touch();
        self.inner.field_ops.fetch_add(1, Ordering::Relaxed);
        Ok(next)
    }

    /// Delete the document at `path`
    ///
    /// Returns `true` (and publishes a `Deleted` event) when a document was
    /// removed; deleting an absent path is a no-op.
    pub fn delete(&self, path: &DocPath) -> bool {
        let removed = self.inner.docs.remove(path).is_some();
        if removed {
            self.inner.docs_deleted.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path, "document deleted");
            self.inner
                .emit(ChangeEvent::new(path.clone(), ChangeKind::Deleted));
        }
        removed
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Run a multi-document transaction
    ///
    /// The closure reads through the store and buffers writes; on `Ok` the
    /// buffer is applied as one unit, on `Err` nothing is applied and the
    /// error is returned. Transactions serialize on a store-wide lock, so a
    /// committed transaction saw no concurrent transactional writes between
    /// its reads and its commit. Create/delete transitions committed this way
    /// publish the same events as the direct operations.
    pub fn transaction<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&mut TransactionContext<'_>) -> Result<T>,
    {
        let _guard = self.inner.commit_lock.lock();
        let mut txn = TransactionContext::new(self);
        match body(&mut txn) {
            Ok(value) => {
                txn.commit()?;
                self.inner.txns_committed.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            }
            Err(e) => {
                self.inner.txns_aborted.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Metrics snapshot
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            docs_created: self.inner.docs_created.load(Ordering::Relaxed),
            docs_deleted: self.inner.docs_deleted.load(Ordering::Relaxed),
            field_ops: self.inner.field_ops.load(Ordering::Relaxed),
            txns_committed: self.inner.txns_committed.load(Ordering::Relaxed),
            txns_aborted: self.inner.txns_aborted.load(Ordering::Relaxed),
        }
    }
}
