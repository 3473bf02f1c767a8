//! Shared wire types for search store operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single hit returned by a search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document id of the hit.
    pub id: String,
    /// Source body of the hit.
    pub source: Value,
}

/// A fully qualified document ready for bulk submission.
///
/// The routing metadata (`index`, `doc_type`, `id`) is carried alongside the
/// source body rather than inside it. `doc_type` is retained for bookkeeping
/// only; the store's bulk API is typeless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDoc {
    /// Index the document is routed to.
    pub index: String,
    /// Logical document type.
    pub doc_type: String,
    /// Explicit document id, if the document carries one.
    pub id: Option<String>,
    /// Document body with routing metadata stripped.
    pub source: Value,
}

/// Failure detail for one document of a bulk submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemError {
    /// Document id the store reported for the failed item, if any.
    pub id: Option<String>,
    /// Failure reason as reported by the store.
    pub reason: String,
}

/// Outcome of one bulk submission.
///
/// Per-item failures are reported here rather than as an `Err`; the caller
/// decides whether they abort the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkSummary {
    /// Number of documents submitted.
    pub total: usize,
    /// Number of documents accepted by the store.
    pub succeeded: usize,
    /// Failures for individual documents.
    pub errors: Vec<BulkItemError>,
}

impl BulkSummary {
    /// Number of documents the store rejected.
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Whether any document of the batch failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
