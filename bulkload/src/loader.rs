//! Index loader.
//!
//! Performs one full load of a document set into a target index and records
//! completion in the tracking index.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{LoaderConfig, MarkerSettings};
use crate::docs::{normalize, DocSource};
use crate::errors::LoadError;
use crate::marker::CompletionMarker;
use bulkload_repository::{BulkDoc, OpenSearchStore, SearchStore, StoreError};

/// Refresh interval value that disables near-real-time refresh.
const REFRESH_DISABLED: &str = "-1";

/// Refresh interval restored after the load.
const REFRESH_NORMAL: &str = "1s";

/// Counters for one completed load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Documents accepted by the store.
    pub documents: usize,
    /// Bulk batches submitted.
    pub batches: usize,
    /// Documents dropped by a best-effort run (`raise_on_error = false`).
    pub dropped: usize,
}

/// Orchestrates one indexing run.
///
/// The run optionally purges the target index, (re)creates it with the
/// configured settings, disables near-real-time refresh, bulk-loads the
/// documents in batches, restores refresh, forces one refresh, and writes a
/// completion marker. The external scheduler decides whether to invoke the
/// run at all by consulting [`IndexLoader::marker`].
pub struct IndexLoader {
    store: Arc<dyn SearchStore>,
    config: LoaderConfig,
    marker_settings: MarkerSettings,
    update_id: String,
}

impl IndexLoader {
    /// Create a loader over an injected store.
    ///
    /// `update_id` is the calling task's identity; re-running the same
    /// logical task is recognized as already done, while a differently
    /// parameterized task gets a distinct marker.
    ///
    /// Fails fast when the configuration names no target index or a zero
    /// chunk size.
    pub fn new(
        store: Arc<dyn SearchStore>,
        config: LoaderConfig,
        marker_settings: MarkerSettings,
        update_id: impl Into<String>,
    ) -> Result<Self, LoadError> {
        if config.index.trim().is_empty() {
            return Err(LoadError::validation("target index must not be empty"));
        }
        if config.chunk_size == 0 {
            return Err(LoadError::validation("chunk_size must be at least 1"));
        }

        Ok(Self {
            store,
            config,
            marker_settings,
            update_id: update_id.into(),
        })
    }

    /// Create a loader connected to the store named by the configuration,
    /// verifying the store is reachable.
    pub async fn connect(
        config: LoaderConfig,
        marker_settings: MarkerSettings,
        update_id: impl Into<String>,
    ) -> Result<Self, LoadError> {
        let store = OpenSearchStore::new(&config.url(), config.timeout)?;
        if !store.ping().await? {
            return Err(StoreError::connection(format!(
                "search store at {} is not reachable",
                config.url()
            ))
            .into());
        }
        Self::new(Arc::new(store), config, marker_settings, update_id)
    }

    /// The completion marker representing this run's dataset version.
    ///
    /// The scheduler consults `marker().exists()` before deciding to run;
    /// this module only reports state, it never self-skips.
    pub fn marker(&self) -> CompletionMarker {
        CompletionMarker::new(
            self.store.clone(),
            self.marker_settings.clone(),
            self.config.index.clone(),
            self.config.doc_type.clone(),
            self.update_id.clone(),
            self.config.marker_hist_size,
        )
    }

    /// Run the load.
    ///
    /// Purge the existing index, if requested. Create the index, if missing.
    /// Apply the mapping, if given. Disable the refresh interval, bulk index
    /// in batches of `chunk_size`, restore the refresh interval, refresh,
    /// and create an entry in the marker index.
    ///
    /// An error at any step before the marker write propagates and leaves
    /// the run "not completed", safe to retry. A failure of the marker write
    /// itself leaves the index loaded but unmarked; a retry redundantly
    /// reloads the same data.
    pub async fn run(&self, source: DocSource) -> Result<LoadStats, LoadError> {
        let index = &self.config.index;

        if self.config.purge_existing_index {
            info!(index = %index, "Purging existing index");
            self.store.delete_index(index).await?;
        }

        if !self.store.index_exists(index).await? {
            self.store.create_index(index, &self.config.settings).await?;
        }

        if let Some(mapping) = &self.config.mapping {
            self.store.put_mapping(index, mapping).await?;
        }

        self.store
            .set_refresh_interval(index, REFRESH_DISABLED)
            .await?;

        let stats = self.load_documents(source).await?;

        self.store
            .set_refresh_interval(index, REFRESH_NORMAL)
            .await?;
        self.store.refresh(index).await?;

        self.marker().touch().await?;

        info!(
            index = %index,
            update_id = %self.update_id,
            documents = stats.documents,
            batches = stats.batches,
            dropped = stats.dropped,
            "Load complete"
        );
        Ok(stats)
    }

    /// Stream the source through the bulk API in `chunk_size` batches.
    async fn load_documents(&self, source: DocSource) -> Result<LoadStats, LoadError> {
        let mut stats = LoadStats::default();
        let mut batch: Vec<BulkDoc> = Vec::with_capacity(self.config.chunk_size);

        for doc in normalize(source, &self.config.index, &self.config.doc_type) {
            batch.push(doc?);
            if batch.len() >= self.config.chunk_size {
                self.submit_batch(&mut batch, &mut stats).await?;
            }
        }
        if !batch.is_empty() {
            self.submit_batch(&mut batch, &mut stats).await?;
        }

        Ok(stats)
    }

    /// Submit one batch and apply the `raise_on_error` policy.
    async fn submit_batch(
        &self,
        batch: &mut Vec<BulkDoc>,
        stats: &mut LoadStats,
    ) -> Result<(), LoadError> {
        let docs: Vec<BulkDoc> = batch.drain(..).collect();
        debug!(count = docs.len(), "Submitting bulk batch");

        let summary = self.store.bulk(&docs).await?;
        stats.batches += 1;
        stats.documents += summary.succeeded;

        if summary.has_errors() {
            if self.config.raise_on_error {
                error!(
                    failed = summary.failed(),
                    total = summary.total,
                    "Bulk batch had failures"
                );
                return Err(LoadError::bulk(format!(
                    "{} of {} documents failed",
                    summary.failed(),
                    summary.total
                )));
            }
            for item in &summary.errors {
                warn!(doc_id = ?item.id, reason = %item.reason, "Dropped document");
            }
            stats.dropped += summary.failed();
        }

        Ok(())
    }
}
