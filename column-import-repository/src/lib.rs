//! # Column Import Repository
//!
//! This crate provides the interfaces for talking to a column-family store,
//! the scan descriptor built from entity configuration, and an in-memory
//! store implementation used for local runs and tests.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod scan;
pub mod types;

pub use config::{ConnectionConfig, DataSourceProperties, SourceSettings};
pub use errors::StoreError;
pub use interfaces::{ResultScanner, StoreConnection, StoreConnector, StoreTable};
pub use memory::{MemoryConnector, MemoryStore};
pub use scan::{ScanBuilder, ScanDescriptor, ScanFactory, ScanOptions};
pub use types::StoreRow;
