//! Error types for the bulkload repository.

mod store_error;

pub use store_error::StoreError;
