//! Interface definitions for the store client.
//!
//! These traits separate the import pipeline from any particular store
//! client, so backends can be swapped (a network client, the in-memory
//! store, or a test double).

mod store_client;

pub use store_client::{ResultScanner, StoreConnection, StoreConnector, StoreTable};
