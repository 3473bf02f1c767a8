//! Completion markers for indexing runs.
//!
//! A marker document in the tracking index records that one logical dataset
//! version was indexed. The external scheduler checks marker existence
//! before deciding to run a task; the loader writes the marker after a
//! successful load.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::MarkerSettings;
use crate::errors::LoadError;
use bulkload_repository::SearchStore;

/// Marker field the pruning query filters on.
const TARGET_INDEX_FIELD: &str = "target_index";

/// Marker field the pruning query sorts by.
const DATE_FIELD: &str = "date";

/// The document stored in the tracking index, one per completed run.
///
/// The document id alone would be sufficient; the parameters are indexed as
/// well for documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerDocument {
    /// Caller-supplied identifier for the logical run.
    pub update_id: String,
    /// Index the run wrote to.
    pub target_index: String,
    /// Doc_type the run wrote.
    pub target_doc_type: String,
    /// Completion timestamp.
    pub date: DateTime<Utc>,
}

/// Durable idempotence record for one (index, doc_type, update_id) run.
///
/// Existence of the marker is equivalent to "this exact combination has been
/// successfully indexed". The tracking index is created lazily on first
/// touch, and at most `hist_size` markers per target index are retained
/// (0 keeps all).
pub struct CompletionMarker {
    store: Arc<dyn SearchStore>,
    marker_index: String,
    marker_doc_type: String,
    index: String,
    doc_type: String,
    update_id: String,
    hist_size: usize,
}

impl CompletionMarker {
    /// Create a marker handle.
    ///
    /// # Arguments
    ///
    /// * `store` - Search store holding the tracking index
    /// * `settings` - Process-wide tracking index/doc_type names
    /// * `index` - Index the run targets
    /// * `doc_type` - Doc_type the run targets
    /// * `update_id` - Identifier for this data set
    /// * `hist_size` - Markers to retain per target index (0: unlimited)
    pub fn new(
        store: Arc<dyn SearchStore>,
        settings: MarkerSettings,
        index: impl Into<String>,
        doc_type: impl Into<String>,
        update_id: impl Into<String>,
        hist_size: usize,
    ) -> Self {
        Self {
            store,
            marker_index: settings.marker_index,
            marker_doc_type: settings.marker_doc_type,
            index: index.into(),
            doc_type: doc_type.into(),
            update_id: update_id.into(),
            hist_size,
        }
    }

    /// Generate the id for the marker document.
    ///
    /// A pure function of the (index, doc_type, update_id) triple, so two
    /// runs with the same key converge on the same document.
    pub fn document_id(&self) -> String {
        let params = format!("{}:{}:{}", self.index, self.doc_type, self.update_id);
        let mut hasher = Sha256::new();
        hasher.update(params.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Test if this run has already completed.
    ///
    /// Returns false both when the marker is not found and when the lookup
    /// fails for any other backend reason; a lookup failure is logged and
    /// reported as "not completed" so an unreachable store is re-run rather
    /// than silently treated as done.
    pub async fn exists(&self) -> bool {
        match self
            .store
            .get_doc(&self.marker_index, &self.document_id())
            .await
        {
            Ok(Some(_)) => true,
            Ok(None) => {
                debug!(update_id = %self.update_id, "Marker document not found");
                false
            }
            Err(err) => {
                warn!(update_id = %self.update_id, error = %err, "Marker lookup failed, treating as not completed");
                false
            }
        }
    }

    /// Mark this update as complete.
    ///
    /// Ensures the tracking index exists, upserts the marker document,
    /// refreshes the tracking index so the marker is immediately visible to
    /// [`CompletionMarker::exists`], and prunes the history. The sequence is
    /// not transactional; a crash mid-way can leave the marker written but
    /// the history unpruned.
    pub async fn touch(&self) -> Result<(), LoadError> {
        self.create_marker_index().await?;

        let marker = MarkerDocument {
            update_id: self.update_id.clone(),
            target_index: self.index.clone(),
            target_doc_type: self.doc_type.clone(),
            date: Utc::now(),
        };
        let body =
            serde_json::to_value(&marker).map_err(|e| LoadError::serialization(e.to_string()))?;

        self.store
            .index_doc(&self.marker_index, &self.document_id(), &body)
            .await?;
        self.store.refresh(&self.marker_index).await?;
        self.prune_history().await?;

        info!(
            update_id = %self.update_id,
            target_index = %self.index,
            "Marked update as complete"
        );
        Ok(())
    }

    /// Create the tracking index if necessary.
    async fn create_marker_index(&self) -> Result<(), LoadError> {
        if !self.store.index_exists(&self.marker_index).await? {
            self.store
                .create_index(&self.marker_index, &json!({}))
                .await?;
        }
        Ok(())
    }

    /// Shrink the history of updates for the target index down to
    /// `hist_size` entries.
    ///
    /// Markers are ordered by date descending and every marker beyond
    /// position `hist_size` is deleted; ordering among equal timestamps is
    /// backend-dependent. A `hist_size` of 0 keeps everything.
    pub async fn prune_history(&self) -> Result<(), LoadError> {
        if self.hist_size == 0 {
            return Ok(());
        }

        let hits = self
            .store
            .search_term_sorted(&self.marker_index, TARGET_INDEX_FIELD, &self.index, DATE_FIELD)
            .await?;

        for hit in hits.iter().skip(self.hist_size) {
            self.store.delete_doc(&self.marker_index, &hit.id).await?;
        }
        if hits.len() > self.hist_size {
            debug!(
                target_index = %self.index,
                pruned = hits.len() - self.hist_size,
                "Pruned marker history"
            );
        }

        self.store.refresh(&self.marker_index).await?;
        Ok(())
    }
}
