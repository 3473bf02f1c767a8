//! Error types for the bulk loader.

use bulkload_repository::StoreError;
use thiserror::Error;

/// Errors that can occur while loading a dataset or touching its marker.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Configuration rejected at construction time.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A document could not be parsed into a JSON object.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A bulk batch had failures and the run is configured to fail fast.
    #[error("Bulk load error: {0}")]
    BulkError(String),

    /// Failed to serialize a document for the store.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error from the search store.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// IO error while reading the document source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LoadError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a bulk load error.
    pub fn bulk(msg: impl Into<String>) -> Self {
        Self::BulkError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
