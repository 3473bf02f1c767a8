//! In-memory search store used by the marker and loader tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;

use bulkload_repository::{BulkDoc, BulkItemError, BulkSummary, SearchHit, SearchStore, StoreError};

struct StoredDoc {
    source: Value,
    seq: u64,
}

#[derive(Default)]
struct State {
    indices: HashSet<String>,
    docs: HashMap<String, HashMap<String, StoredDoc>>,
    seq: u64,
    refresh_intervals: Vec<(String, String)>,
    refreshes: Vec<String>,
    mappings: Vec<(String, Value)>,
    bulk_batches: Vec<usize>,
}

/// Mock search store backed by hash maps, recording every call of interest.
///
/// Documents indexed via `index_doc` or `bulk` auto-create their index, like
/// the real store does. Failure injection covers the two scenarios the tests
/// need: a failing marker lookup and per-item bulk rejections.
pub(crate) struct MemoryStore {
    state: Mutex<State>,
    fail_get: AtomicBool,
    fail_bulk_items: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            fail_get: AtomicBool::new(false),
            fail_bulk_items: AtomicBool::new(false),
        }
    }

    /// Make every `get_doc` call fail with a request error.
    pub(crate) fn fail_get_doc(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make every bulk submission reject all of its documents.
    pub(crate) fn fail_bulk_items(&self, fail: bool) {
        self.fail_bulk_items.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn has_index(&self, index: &str) -> bool {
        self.state.lock().unwrap().indices.contains(index)
    }

    pub(crate) fn doc_count(&self, index: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .docs
            .get(index)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub(crate) fn bulk_batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().bulk_batches.clone()
    }

    pub(crate) fn refresh_intervals(&self, index: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .refresh_intervals
            .iter()
            .filter(|(idx, _)| idx == index)
            .map(|(_, interval)| interval.clone())
            .collect()
    }

    pub(crate) fn refresh_count(&self, index: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .refreshes
            .iter()
            .filter(|idx| idx.as_str() == index)
            .count()
    }

    pub(crate) fn mapping_count(&self, index: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .mappings
            .iter()
            .filter(|(idx, _)| idx == index)
            .count()
    }
}

fn put_doc(state: &mut State, index: &str, id: &str, source: Value) {
    state.indices.insert(index.to_string());
    state.seq += 1;
    let seq = state.seq;
    state
        .docs
        .entry(index.to_string())
        .or_default()
        .insert(id.to_string(), StoredDoc { source, seq });
}

#[async_trait]
impl SearchStore for MemoryStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().indices.contains(index))
    }

    async fn create_index(&self, index: &str, _settings: &Value) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.indices.insert(index.to_string()) {
            return Err(StoreError::index_creation(format!(
                "index already exists: {}",
                index
            )));
        }
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.indices.remove(index);
        state.docs.remove(index);
        Ok(())
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.mappings.push((index.to_string(), mapping.clone()));
        Ok(())
    }

    async fn set_refresh_interval(&self, index: &str, interval: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .refresh_intervals
            .push((index.to_string(), interval.to_string()));
        Ok(())
    }

    async fn refresh(&self, index: &str) -> Result<(), StoreError> {
        self.state.lock().unwrap().refreshes.push(index.to_string());
        Ok(())
    }

    async fn get_doc(&self, index: &str, id: &str) -> Result<Option<Value>, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::request("injected get failure"));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .docs
            .get(index)
            .and_then(|docs| docs.get(id))
            .map(|doc| doc.source.clone()))
    }

    async fn index_doc(&self, index: &str, id: &str, body: &Value) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        put_doc(&mut state, index, id, body.clone());
        Ok(())
    }

    async fn delete_doc(&self, index: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(docs) = state.docs.get_mut(index) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn search_term_sorted(
        &self,
        index: &str,
        field: &str,
        value: &str,
        sort_field: &str,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut matches: Vec<(String, Value, u64)> = state
            .docs
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.source[field] == Value::String(value.to_string()))
                    .map(|(id, doc)| (id.clone(), doc.source.clone(), doc.seq))
                    .collect()
            })
            .unwrap_or_default();

        // Descending by the sort field, falling back to insertion order for
        // equal timestamps (the "backend's stable sort")
        matches.sort_by(|a, b| {
            let parse = |doc: &Value| {
                doc[sort_field]
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            };
            match (parse(&a.1), parse(&b.1)) {
                (Some(da), Some(db)) => db.cmp(&da).then(b.2.cmp(&a.2)),
                _ => b.2.cmp(&a.2),
            }
        });

        Ok(matches
            .into_iter()
            .map(|(id, source, _)| SearchHit { id, source })
            .collect())
    }

    async fn bulk(&self, docs: &[BulkDoc]) -> Result<BulkSummary, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.bulk_batches.push(docs.len());

        if self.fail_bulk_items.load(Ordering::SeqCst) {
            return Ok(BulkSummary {
                total: docs.len(),
                succeeded: 0,
                errors: docs
                    .iter()
                    .map(|doc| BulkItemError {
                        id: doc.id.clone(),
                        reason: "injected bulk rejection".to_string(),
                    })
                    .collect(),
            });
        }

        for (n, doc) in docs.iter().enumerate() {
            let id = doc
                .id
                .clone()
                .unwrap_or_else(|| format!("auto_{}_{}", state.seq, n));
            put_doc(&mut state, &doc.index, &id, doc.source.clone());
        }

        Ok(BulkSummary {
            total: docs.len(),
            succeeded: docs.len(),
            errors: Vec::new(),
        })
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
