//! Multi-document transactions
//!
//! The transaction context buffers writes and reads through its own buffer,
//! so a transaction observes its staged state. Nothing reaches the store
//! until commit, which replays the buffered operations while the store-wide
//! commit lock is held. A closure error discards the buffer.
//!
//! Type errors (incrementing a string field, array ops on a scalar) surface
//! at staging time, against the state the operation would actually meet, so
//! commit replay does not fail on them.

use crate::store::DocumentStore;
use rustc_hash::FxHashMap;
use storyhive_core::{DocPath, Document, Error, FieldOp, Result, Value};

enum PendingOp {
    Set {
        path: DocPath,
        fields: Vec<(String, Value)>,
    },
    Update {
        path: DocPath,
        ops: Vec<(String, FieldOp)>,
    },
    Delete {
        path: DocPath,
    },
}

/// Buffered view of the store inside one transaction
///
/// Obtained from [`DocumentStore::transaction`]; not constructible directly.
pub struct TransactionContext<'a> {
    store: &'a DocumentStore,
    /// Staged state per touched path; `None` marks a staged delete
    overlay: FxHashMap<DocPath, Option<Document>>,
    ops: Vec<PendingOp>,
}

impl<'a> TransactionContext<'a> {
    pub(crate) fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            overlay: FxHashMap::default(),
            ops: Vec::new(),
        }
    }

    /// Read a document as this transaction would leave it
    pub fn get(&self, path: &DocPath) -> Option<Document> {
        match self.overlay.get(path) {
            Some(staged) => staged.clone(),
            None => self.store.get(path),
        }
    }

    /// Whether a document exists in this transaction's view
    pub fn exists(&self, path: &DocPath) -> bool {
        match self.overlay.get(path) {
            Some(staged) => staged.is_some(),
            None => self.store.exists(path),
        }
    }

    /// Read one field in this transaction's view
    pub fn get_field(&self, path: &DocPath, field: &str) -> Option<Value> {
        self.get(path).and_then(|doc| doc.field(field).cloned())
    }

    /// Stage a document write, creating or replacing
    pub fn set(&mut self, path: &DocPath, fields: impl IntoIterator<Item = (String, Value)>) {
        let fields: Vec<(String, Value)> = fields.into_iter().collect();
        let staged = match self.get(path) {
            Some(mut doc) => {
                doc.fields = fields.iter().cloned().collect();
                doc.touch();
                doc
            }
            None => Document::new(fields.iter().cloned()),
        };
        self.overlay.insert(path.clone(), Some(staged));
        self.ops.push(PendingOp::Set {
            path: path.clone(),
            fields,
        });
    }

    /// Stage field operations against an existing document
    ///
    /// # Errors
    /// `Error::DocumentNotFound` when the document does not exist in this
    /// transaction's view; `Error::FieldTypeMismatch` when an op does not fit.
    pub fn update(&mut self, path: &DocPath, ops: &[(&str, FieldOp)]) -> Result<()> {
        let mut staged = self
            .get(path)
            .ok_or_else(|| Error::DocumentNotFound(path.clone()))?;
        for (field, op) in ops {
            staged.apply(field, op)?;
        }
        staged.touch();
        self.overlay.insert(path.clone(), Some(staged));
        self.ops.push(PendingOp::Update {
            path: path.clone(),
            ops: ops
                .iter()
                .map(|(field, op)| (field.to_string(), op.clone()))
                .collect(),
        });
        Ok(())
    }

    /// Stage an atomic add to an integer field, returning the staged value
    ///
    /// # Errors
    /// Same as [`TransactionContext::update`].
    pub fn increment(&mut self, path: &DocPath, field: &str, delta: i64) -> Result<i64> {
        self.update(path, &[(field, FieldOp::Increment(delta))])?;
        match self.get_field(path, field) {
            Some(Value::Int(n)) => Ok(n),
            _ => Err(Error::InvalidOperation(format!(
                "staged increment left no Int at {}/{}",
                path, field
            ))),
        }
    }

    /// Stage a delete; returns whether the document existed in this view
    pub fn delete(&mut self, path: &DocPath) -> bool {
        let existed = self.exists(path);
        self.overlay.insert(path.clone(), None);
        if existed {
            self.ops.push(PendingOp::Delete { path: path.clone() });
        }
        existed
    }

    /// Replay the buffer against the store. Called with the commit lock held.
    pub(crate) fn commit(self) -> Result<()> {
        let store = self.store;
        for op in self.ops {
            match op {
                PendingOp::Set { path, fields } => {
                    store.set(&path, fields);
                }
                PendingOp::Update { path, ops } => {
                    let borrowed: Vec<(&str, FieldOp)> = ops
                        .iter()
                        .map(|(field, op)| (field.as_str(), op.clone()))
                        .collect();
                    store.update(&path, &borrowed)?;
                }
                PendingOp::Delete { path } => {
                    store.delete(&path);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use storyhive_core::{ChangeEvent, ChangeKind, ChangeSink};

    fn path(raw: &str) -> DocPath {
        DocPath::parse(raw).unwrap()
    }

    #[test]
    fn test_commit_applies_all_writes() {
        let store = DocumentStore::new();
        store.set(&path("users/a"), [("n".to_string(), Value::Int(0))]);
        store.set(&path("users/b"), [("n".to_string(), Value::Int(0))]);

        store
            .transaction(|txn| {
                txn.increment(&path("users/a"), "n", 1)?;
                txn.increment(&path("users/b"), "n", 1)?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.get_field(&path("users/a"), "n"), Some(Value::Int(1)));
        assert_eq!(store.get_field(&path("users/b"), "n"), Some(Value::Int(1)));
        assert_eq!(store.stats().txns_committed, 1);
    }

    #[test]
    fn test_abort_applies_nothing() {
        let store = DocumentStore::new();
        store.set(&path("users/a"), [("n".to_string(), Value::Int(0))]);

        let result: Result<()> = store.transaction(|txn| {
            txn.increment(&path("users/a"), "n", 1)?;
            Err(Error::InvalidOperation("forced failure".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.get_field(&path("users/a"), "n"), Some(Value::Int(0)));
        assert_eq!(store.stats().txns_aborted, 1);
    }

    #[test]
    fn test_reads_see_staged_writes() {
        let store = DocumentStore::new();
        store.set(&path("users/a"), [("n".to_string(), Value::Int(10))]);

        store
            .transaction(|txn| {
                txn.increment(&path("users/a"), "n", 5)?;
                assert_eq!(txn.get_field(&path("users/a"), "n"), Some(Value::Int(15)));
                txn.delete(&path("users/a"));
                assert!(!txn.exists(&path("users/a")));
                Ok(())
            })
            .unwrap();

        assert!(!store.exists(&path("users/a")));
    }

    #[test]
    fn test_update_missing_fails_at_staging() {
        let store = DocumentStore::new();
        let result: Result<()> = store.transaction(|txn| {
            txn.update(&path("users/ghost"), &[("n", FieldOp::Increment(1))])?;
            Ok(())
        });
        assert!(matches!(result, Err(Error::DocumentNotFound(_))));
    }

    #[test]
    fn test_set_inside_transaction_creates_on_commit() {
        let store = DocumentStore::new();
        store
            .transaction(|txn| {
                txn.set(&path("ledger/e1"), [("seen".to_string(), Value::Bool(true))]);
                assert!(txn.exists(&path("ledger/e1")));
                Ok(())
            })
            .unwrap();
        assert!(store.exists(&path("ledger/e1")));
    }

    #[test]
    fn test_committed_creates_emit_events() {
        struct Recorder(AtomicUsize);
        impl ChangeSink for Recorder {
            fn publish(&self, event: ChangeEvent) {
                assert_eq!(event.kind, ChangeKind::Created);
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let store = DocumentStore::new();
        let recorder = Arc::new(Recorder(AtomicUsize::new(0)));
        store.attach_sink(recorder.clone());

        store
            .transaction(|txn| {
                txn.set(&path("users/a"), []);
                txn.set(&path("users/b"), []);
                Ok(())
            })
            .unwrap();

        assert_eq!(recorder.0.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_delete_absent_stages_nothing() {
        let store = DocumentStore::new();
        store
            .transaction(|txn| {
                assert!(!txn.delete(&path("users/ghost")));
                Ok(())
            })
            .unwrap();
        assert_eq!(store.stats().docs_deleted, 0);
    }
}
