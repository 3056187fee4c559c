//! Error types for the store repository.

mod store_error;

pub use store_error::StoreError;
