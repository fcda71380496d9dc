//! Documents and field operations
//!
//! A document is a flat map of named fields. Version is bumped on every
//! mutation and timestamps are epoch milliseconds.
//!
//! `FieldOp` is the vocabulary of single-field mutations the store applies
//! atomically per document. `Increment` is the primitive the counter triggers
//! rely on: concurrent increments to the same field serialize at the storage
//! layer and never lose a delta to each other.

use crate::error::{Error, Result};
use crate::value::Value;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A single mutation of one named field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldOp {
    /// Replace (or create) the field with the given value
    Set(Value),
    /// Add a signed delta to an integer field
    ///
    /// A missing field is treated as 0 before the delta is applied. Any
    /// non-Int value is a type error.
    Increment(i64),
    /// Append the value to an array field unless already present
    ///
    /// A missing field is created as a one-element array.
    ArrayUnion(Value),
    /// Remove every occurrence of the value from an array field
    ///
    /// A missing field is left missing.
    ArrayRemove(Value),
}

/// A stored document: named fields plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Field name to value
    pub fields: FxHashMap<String, Value>,
    /// Bumped on every mutation, starts at 1
    pub version: u64,
    /// Creation time, epoch millis
    pub created_at: i64,
    /// Last mutation time, epoch millis
    pub updated_at: i64,
}

impl Document {
    /// Create a document from initial fields, at version 1
    pub fn new(fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        let now = now_millis();
        Self {
            fields: fields.into_iter().collect(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an empty document
    pub fn empty() -> Self {
        Self::new([])
    }

    /// Look up a field value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Integer field value, defaulting a missing field to 0
    ///
    /// # Errors
    /// Returns `Error::FieldTypeMismatch` when the field exists with a
    /// non-Int value.
    pub fn int_field(&self, name: &str) -> Result<i64> {
        match self.fields.get(name) {
            None => Ok(0),
            Some(Value::Int(n)) => Ok(*n),
            Some(other) => Err(Error::FieldTypeMismatch {
                field: name.to_string(),
                expected: "Int",
                actual: other.type_name(),
            }),
        }
    }

    /// Bump version and update timestamp after a mutation
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = now_millis();
    }

    /// Apply one field operation in place
    ///
    /// Does not touch the document; callers batch ops and touch once.
    ///
    /// # Errors
    /// Returns `Error::FieldTypeMismatch` when the stored value's type does
    /// not admit the operation.
    pub fn apply(&mut self, field: &str, op: &FieldOp) -> Result<()> {
        match op {
            FieldOp::Set(value) => {
                self.fields.insert(field.to_string(), value.clone());
                Ok(())
            }
            FieldOp::Increment(delta) => {
                let current = self.int_field(field)?;
                self.fields
                    .insert(field.to_string(), Value::Int(current + delta));
                Ok(())
            }
            FieldOp::ArrayUnion(value) => match self.fields.get_mut(field) {
                None => {
                    self.fields
                        .insert(field.to_string(), Value::Array(vec![value.clone()]));
                    Ok(())
                }
                Some(Value::Array(items)) => {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                    Ok(())
                }
                Some(other) => Err(Error::FieldTypeMismatch {
                    field: field.to_string(),
                    expected: "Array",
                    actual: other.type_name(),
                }),
            },
            FieldOp::ArrayRemove(value) => match self.fields.get_mut(field) {
                None => Ok(()),
                Some(Value::Array(items)) => {
                    items.retain(|item| item != value);
                    Ok(())
                }
                Some(other) => Err(Error::FieldTypeMismatch {
                    field: field.to_string(),
                    expected: "Array",
                    actual: other.type_name(),
                }),
            },
        }
    }
}
