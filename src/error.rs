//! Custom error types for audited-store
//!
//! This module defines the error hierarchy for the crate using thiserror.
//! Only [`StoreError::InvalidArgument`] ever crosses the repository boundary
//! from a CRUD call; the other variants are absorbed into audit entries and
//! safe return values.

use thiserror::Error;

/// The main error type for audited-store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Caller violated a precondition (empty document, filter, payload or user)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying store rejected or could not complete an operation
    #[error("Operation failed: {0}")]
    Operation(String),

    /// An audit entry could not be durably recorded
    #[error("Audit persistence failed: {0}")]
    AuditPersistence(String),

    /// A query plan could not be obtained
    #[error("Query plan inspection failed: {0}")]
    Inspection(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl StoreError {
    /// Create an invalid-argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a store operation failure
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(message.into())
    }

    /// Check if this is a caller precondition violation
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a store-level failure
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for audited-store operations
pub type StoreResult<T> = Result<T, StoreError>;
