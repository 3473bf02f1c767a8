//! Configuration for the bulk loader and the completion marker.

use std::env;
use std::time::Duration;

use serde_json::{json, Value};

/// Default tracking index name.
const DEFAULT_MARKER_INDEX: &str = "update_log";

/// Default tracking doc_type name.
const DEFAULT_MARKER_DOC_TYPE: &str = "entry";

/// Environment variable overriding the tracking index name.
const MARKER_INDEX_ENV: &str = "BULKLOAD_MARKER_INDEX";

/// Environment variable overriding the tracking doc_type name.
const MARKER_DOC_TYPE_ENV: &str = "BULKLOAD_MARKER_DOC_TYPE";

/// Process-wide names of the tracking index and its doc_type.
///
/// Read once during application startup and passed by value into each
/// [`crate::CompletionMarker`]; components never consult the environment
/// themselves.
#[derive(Debug, Clone)]
pub struct MarkerSettings {
    /// Name of the tracking index.
    pub marker_index: String,
    /// Doc_type recorded on marker documents.
    pub marker_doc_type: String,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            marker_index: DEFAULT_MARKER_INDEX.to_string(),
            marker_doc_type: DEFAULT_MARKER_DOC_TYPE.to_string(),
        }
    }
}

impl MarkerSettings {
    /// Load the settings from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `BULKLOAD_MARKER_INDEX`: tracking index name (default: update_log)
    /// - `BULKLOAD_MARKER_DOC_TYPE`: tracking doc_type name (default: entry)
    pub fn from_env() -> Self {
        let marker_index =
            env::var(MARKER_INDEX_ENV).unwrap_or_else(|_| DEFAULT_MARKER_INDEX.to_string());
        let marker_doc_type =
            env::var(MARKER_DOC_TYPE_ENV).unwrap_or_else(|_| DEFAULT_MARKER_DOC_TYPE.to_string());

        Self {
            marker_index,
            marker_doc_type,
        }
    }
}

/// Configuration for one indexing run.
///
/// Every field has a documented default except `index`, which has none and
/// must be supplied at construction. `settings` is applied only at index
/// creation time.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Store server host.
    pub host: String,
    /// Store server port.
    pub port: u16,
    /// The target index. May exist or not.
    pub index: String,
    /// The target doc_type.
    pub doc_type: String,
    /// Settings body used at index creation time.
    pub settings: Value,
    /// Custom field mapping applied after creation, or `None`.
    pub mapping: Option<Value>,
    /// Number of documents per bulk API call.
    pub chunk_size: usize,
    /// Whether the first failed batch aborts the whole run.
    pub raise_on_error: bool,
    /// Whether to delete the target index completely before any indexing.
    pub purge_existing_index: bool,
    /// Number of markers retained per target index. 0: unlimited.
    pub marker_hist_size: usize,
    /// Per-call network timeout.
    pub timeout: Duration,
}

impl LoaderConfig {
    /// Create a configuration for the given target index with all defaults:
    /// localhost:9200, doc_type `default`, empty settings, no mapping,
    /// chunk size 2000, fail fast, no purge, unbounded marker history,
    /// 10 second timeout.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9200,
            index: index.into(),
            doc_type: "default".to_string(),
            settings: json!({ "settings": {} }),
            mapping: None,
            chunk_size: 2000,
            raise_on_error: true,
            purge_existing_index: false,
            marker_hist_size: 0,
            timeout: Duration::from_secs(10),
        }
    }

    /// The store URL for this configuration.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
