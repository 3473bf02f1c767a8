//! # Bulkload
//!
//! Glue that lets a task-orchestration framework treat "indexing a dataset
//! into a search store" as a trackable, idempotent unit of work.
//!
//! ## Architecture
//!
//! Two cooperating components:
//!
//! 1. **CompletionMarker**: records, checks and prunes "this dataset version
//!    was indexed" facts in a dedicated tracking index
//! 2. **IndexLoader**: performs one full load of a document set into a
//!    target index and records completion
//!
//! The external scheduler consults [`CompletionMarker::exists`] before
//! deciding to run a task and invokes [`IndexLoader::run`] to execute it.

pub mod config;
pub mod docs;
pub mod errors;
pub mod loader;
pub mod marker;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{LoaderConfig, MarkerSettings};
pub use docs::DocSource;
pub use errors::LoadError;
pub use loader::{IndexLoader, LoadStats};
pub use marker::CompletionMarker;
