//! In-memory store implementation.
//!
//! Serves tables held in process memory through the same connector, table and
//! scanner interfaces a network client implements. Used by the binary to run
//! imports from a JSON snapshot and by tests, with failure injection for every
//! lifecycle step.

mod connector;
mod snapshot;
mod store;

pub use connector::{ConnectorStats, FailurePlan, MemoryConnector, DEFAULT_CACHING};
pub use snapshot::{RowSnapshot, TableSnapshot};
pub use store::MemoryStore;
