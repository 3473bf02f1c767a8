//! Search store trait definition.
//!
//! This module defines the abstract interface over the backing document
//! store, allowing for different backend implementations (OpenSearch,
//! Elasticsearch, in-memory test doubles).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;
use crate::types::{BulkDoc, BulkSummary, SearchHit};

/// Abstracts the HTTP/JSON document store behind the bulk loader.
///
/// Implementations are injected into the loader and the completion marker to
/// enable dependency injection and easy testing with mock implementations.
/// The exact request/response shapes are defined by the backing store; this
/// trait only names the operations the loader relies on.
///
/// All methods return `Result<T, StoreError>` for consistent error handling
/// across backend implementations.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    /// Create an index with the given settings body.
    ///
    /// Fails if the index already exists.
    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), StoreError>;

    /// Delete an index.
    ///
    /// If the index doesn't exist, the operation is considered successful.
    async fn delete_index(&self, index: &str) -> Result<(), StoreError>;

    /// Apply a field mapping to an index.
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), StoreError>;

    /// Set the refresh interval of an index.
    ///
    /// `"-1"` disables near-real-time refresh; `"1s"` restores the normal
    /// interval.
    async fn set_refresh_interval(&self, index: &str, interval: &str) -> Result<(), StoreError>;

    /// Force a refresh of an index so recent writes become searchable.
    async fn refresh(&self, index: &str) -> Result<(), StoreError>;

    /// Fetch a document by id.
    ///
    /// Returns `Ok(None)` when the document (or the index) does not exist.
    async fn get_doc(&self, index: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Index (upsert) a document under an explicit id.
    ///
    /// If a document with the same id already exists, it is replaced.
    async fn index_doc(&self, index: &str, id: &str, body: &Value) -> Result<(), StoreError>;

    /// Delete a document by id.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    async fn delete_doc(&self, index: &str, id: &str) -> Result<(), StoreError>;

    /// Search an index with a single term filter, sorted descending.
    ///
    /// Returns the matching hits ordered by `sort_field` descending. The
    /// result is bounded by a fixed page size chosen large enough to cover
    /// every marker of an index in practice; ordering among equal sort values
    /// is whatever the backend's sort yields.
    async fn search_term_sorted(
        &self,
        index: &str,
        field: &str,
        value: &str,
        sort_field: &str,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Submit a batch of documents to the bulk API.
    ///
    /// Per-document failures are reported in the returned summary, not as an
    /// `Err`; only a failure of the submission itself is an error.
    async fn bulk(&self, docs: &[BulkDoc]) -> Result<BulkSummary, StoreError>;

    /// Check whether the store is reachable.
    async fn ping(&self) -> Result<bool, StoreError>;
}
