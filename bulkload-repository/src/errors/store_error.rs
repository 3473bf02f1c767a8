//! Search store error types.
//!
//! This module defines the error types that can occur during search store
//! operations.

use thiserror::Error;

/// Errors that can occur during search store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Failed to establish connection to the search store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A request could not be sent or its transport failed.
    #[error("Request error: {0}")]
    RequestError(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to delete an index.
    #[error("Index deletion error: {0}")]
    IndexDeletionError(String),

    /// Failed to apply a mapping to an index.
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// Failed to update index settings.
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// A document get, index or delete operation failed.
    #[error("Document error: {0}")]
    DocumentError(String),

    /// A search request failed.
    #[error("Search error: {0}")]
    SearchError(String),

    /// A bulk submission failed entirely.
    #[error("Bulk error: {0}")]
    BulkError(String),

    /// Failed to parse a response from the search store.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search store.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an index deletion error.
    pub fn index_deletion(msg: impl Into<String>) -> Self {
        Self::IndexDeletionError(msg.into())
    }

    /// Create a mapping error.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::MappingError(msg.into())
    }

    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::SettingsError(msg.into())
    }

    /// Create a document error.
    pub fn document(msg: impl Into<String>) -> Self {
        Self::DocumentError(msg.into())
    }

    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::SearchError(msg.into())
    }

    /// Create a bulk error.
    pub fn bulk(msg: impl Into<String>) -> Self {
        Self::BulkError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
