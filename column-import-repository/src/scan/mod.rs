//! Scan construction.
//!
//! A `ScanDescriptor` describes which columns to return and which rows to
//! filter out. `ScanBuilder` builds one from entity configuration.

mod builder;
mod descriptor;
mod filter;

pub use builder::{ScanBuilder, ScanFactory, CACHING, COLUMNS, REQUIRED, TIMEOUT_MS};
pub use descriptor::{ScanDescriptor, ScanOptions};
pub use filter::{CompareOp, FilterList, FilterOperator, SingleColumnValueFilter};
