//! OpenSearch store implementation.
//!
//! This module provides the concrete implementation of `SearchStore` using
//! the OpenSearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesPutMappingParts,
        IndicesPutSettingsParts, IndicesRefreshParts,
    },
    BulkOperation, BulkOperations, BulkParts, DeleteParts, GetParts, IndexParts, OpenSearch,
    SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::SearchStore;
use crate::types::{BulkDoc, BulkItemError, BulkSummary, SearchHit};

/// Upper bound on hits returned by [`SearchStore::search_term_sorted`].
///
/// The store's default page size would silently cap the result at 10 hits;
/// marker history for one index stays far below this bound.
const SEARCH_PAGE_SIZE: i64 = 10_000;

/// OpenSearch store implementation.
///
/// Speaks the Elasticsearch-compatible REST API over a single-node
/// connection pool. Every call carries a fixed request timeout; there is no
/// retry layer, a timed-out call fails the operation outright.
///
/// # Example
///
/// ```ignore
/// let store = OpenSearchStore::new("http://localhost:9200", Duration::from_secs(10))?;
/// if !store.index_exists("articles").await? {
///     store.create_index("articles", &json!({"settings": {}})).await?;
/// }
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
    timeout: Duration,
}

impl OpenSearchStore {
    /// Create a new store client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The store server URL (e.g., "http://localhost:9200")
    /// * `timeout` - Per-call request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchStore)` - A new client instance
    /// * `Err(StoreError)` - If connection setup fails
    pub fn new(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let parsed_url = Url::parse(url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, timeout_ms = timeout.as_millis() as u64, "Created search store client");

        Ok(Self { client, timeout })
    }

    /// Create a new store client for a host/port pair over plain HTTP.
    pub fn for_host(host: &str, port: u16, timeout: Duration) -> Result<Self, StoreError> {
        Self::new(&format!("http://{}:{}", host, port), timeout)
    }

    /// Read the response body of a failed call for the error message.
    async fn failure_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

/// Build the settings body that sets an index refresh interval.
fn refresh_interval_body(interval: &str) -> Value {
    json!({ "index": { "refresh_interval": interval } })
}

/// Build a term-filtered search body.
fn term_query_body(field: &str, value: &str) -> Value {
    json!({ "query": { "term": { field: value } } })
}

/// Fold a bulk response body into a [`BulkSummary`].
///
/// The bulk API answers 200 even when individual items failed; failures are
/// reported per item under `items[*].index.error`.
fn parse_bulk_response(total: usize, body: &Value) -> BulkSummary {
    let mut errors = Vec::new();

    if body["errors"].as_bool().unwrap_or(false) {
        if let Some(items) = body["items"].as_array() {
            for item in items {
                let entry = &item["index"];
                if entry["error"].is_object() {
                    let reason = entry["error"]["reason"]
                        .as_str()
                        .or_else(|| entry["error"]["type"].as_str())
                        .unwrap_or("unknown bulk failure")
                        .to_string();
                    errors.push(BulkItemError {
                        id: entry["_id"].as_str().map(str::to_string),
                        reason,
                    });
                }
            }
        }
    }

    BulkSummary {
        total,
        succeeded: total - errors.len(),
        errors,
    }
}

#[async_trait]
impl SearchStore for OpenSearchStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }

        let error_body = Self::failure_body(response).await;
        error!(index = %index, status = %status, body = %error_body, "Index exists check failed");
        Err(StoreError::request(format!(
            "Exists check failed with status {}: {}",
            status, error_body
        )))
    }

    async fn create_index(&self, index: &str, settings: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings)
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Index creation failed");
            return Err(StoreError::index_creation(format!(
                "Create failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Index created");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - the index may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Index deletion failed");
            return Err(StoreError::index_deletion(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Index deleted");
        Ok(())
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(mapping)
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Mapping update failed");
            return Err(StoreError::mapping(format!(
                "Put mapping failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Mapping applied");
        Ok(())
    }

    async fn set_refresh_interval(&self, index: &str, interval: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .put_settings(IndicesPutSettingsParts::Index(&[index]))
            .body(refresh_interval_body(interval))
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Settings update failed");
            return Err(StoreError::settings(format!(
                "Put settings failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, interval = %interval, "Refresh interval set");
        Ok(())
    }

    async fn refresh(&self, index: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Refresh failed");
            return Err(StoreError::request(format!(
                "Refresh failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Index refreshed");
        Ok(())
    }

    async fn get_doc(&self, index: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, doc_id = %id, status = %status, body = %error_body, "Document get failed");
            return Err(StoreError::document(format!(
                "Get failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        Ok(Some(body["_source"].clone()))
    }

    async fn index_doc(&self, index: &str, id: &str, body: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(body)
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, doc_id = %id, status = %status, body = %error_body, "Document index failed");
            return Err(StoreError::document(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, doc_id = %id, "Document indexed");
        Ok(())
    }

    async fn delete_doc(&self, index: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - the document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, doc_id = %id, status = %status, body = %error_body, "Document delete failed");
            return Err(StoreError::document(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, doc_id = %id, "Document deleted");
        Ok(())
    }

    async fn search_term_sorted(
        &self,
        index: &str,
        field: &str,
        value: &str,
        sort_field: &str,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let sort_clause = format!("{}:desc", sort_field);
        let sort = [sort_clause.as_str()];

        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(term_query_body(field, value))
            .sort(&sort)
            .size(SEARCH_PAGE_SIZE)
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Search failed");
            return Err(StoreError::search(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        let hits = body["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| {
                        let id = hit["_id"].as_str()?.to_string();
                        Some(SearchHit {
                            id,
                            source: hit["_source"].clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(hits)
    }

    async fn bulk(&self, docs: &[BulkDoc]) -> Result<BulkSummary, StoreError> {
        if docs.is_empty() {
            return Ok(BulkSummary::default());
        }

        let mut ops = BulkOperations::new();
        for doc in docs {
            let op = BulkOperation::index(&doc.source).index(doc.index.as_str());
            let op = match &doc.id {
                Some(id) => op.id(id.as_str()),
                None => op,
            };
            ops.push(op)
                .map_err(|e| StoreError::serialization(e.to_string()))?;
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(vec![ops])
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(status = %status, body = %error_body, "Bulk submission failed");
            return Err(StoreError::bulk(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        Ok(parse_bulk_response(docs.len(), &body))
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        let response = self
            .client
            .ping()
            .request_timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::request(e.to_string()))?;

        Ok(response.status_code().is_success())
    }
}
