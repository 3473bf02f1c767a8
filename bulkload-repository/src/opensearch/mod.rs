//! OpenSearch implementation of the search store.
//!
//! This module provides a concrete implementation of `SearchStore` using the
//! OpenSearch Rust client, which speaks the Elasticsearch-compatible REST
//! API.

mod client;

pub use client::OpenSearchStore;
