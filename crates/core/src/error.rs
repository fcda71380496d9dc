//! Error types for storyhive
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::path::DocPath;
use thiserror::Error;

/// Result type alias for storyhive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document store and trigger runtime
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Document does not exist at the addressed path
    #[error("Document not found: {0}")]
    DocumentNotFound(DocPath),

    /// Malformed document or collection path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Malformed trigger path pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Field holds a value of the wrong type for the requested operation
    #[error("Field '{field}' type mismatch: expected {expected}, got {actual}")]
    FieldTypeMismatch {
        /// Field name within the document
        field: String,
        /// Type the operation requires
        expected: &'static str,
        /// Type actually stored
        actual: &'static str,
    },

    /// Required path parameter is absent or empty
    #[error("Missing path parameter: {0}")]
    MissingParam(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Transaction rolled back before commit
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// Event queue is at capacity or the runtime has shut down
    #[error("Delivery queue is full or shut down")]
    QueueFull,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_document_not_found() {
        let path = DocPath::parse("users/u1").unwrap();
        let err = Error::DocumentNotFound(path);
        let msg = err.to_string();
        assert!(msg.contains("Document not found"));
        assert!(msg.contains("users/u1"));
    }

    #[test]
    fn test_error_display_invalid_path() {
        let err = Error::InvalidPath("users//x".to_string());
        assert!(err.to_string().contains("Invalid path"));
    }

    #[test]
    fn test_error_display_field_type_mismatch() {
        let err = Error::FieldTypeMismatch {
            field: "followersCount".to_string(),
            expected: "Int",
            actual: "String",
        };
        let msg = err.to_string();
        assert!(msg.contains("followersCount"));
        assert!(msg.contains("Int"));
        assert!(msg.contains("String"));
    }

    #[test]
    fn test_error_display_missing_param() {
        let err = Error::MissingParam("followerId".to_string());
        assert!(err.to_string().contains("followerId"));
    }

    #[test]
    fn test_error_display_transaction_aborted() {
        let err = Error::TransactionAborted("caller error".to_string());
        assert!(err.to_string().contains("Transaction aborted"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad: std::result::Result<i64, serde_json::Error> =
            serde_json::from_str("not json");
        let err: Error = bad.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(7)
        }
        assert_eq!(returns_result().unwrap(), 7);
    }
}
