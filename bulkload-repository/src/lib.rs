//! # Bulkload Repository
//!
//! This crate provides the trait and implementation for interacting with the
//! search store backing the bulk loader. It includes definitions for errors,
//! the `SearchStore` interface, shared wire types and a concrete
//! implementation for OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::StoreError;
pub use interfaces::SearchStore;
pub use opensearch::OpenSearchStore;
pub use types::{BulkDoc, BulkItemError, BulkSummary, SearchHit};
