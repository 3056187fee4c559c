//! # Column Import Shared
//!
//! Types shared between the store repository and the import pipeline:
//! column addressing, the host context abstraction, and the flat row record
//! handed to the indexer.

pub mod column;
pub mod context;
pub mod error;
pub mod record;

pub use column::{ColumnDescriptor, COLUMN_DELIMITER};
pub use context::{EntityContext, ImportContext};
pub use error::ConfigurationError;
pub use record::{RowRecord, ROW_KEY_FIELD};
