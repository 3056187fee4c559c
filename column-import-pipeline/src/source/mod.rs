//! Row sources for the import pipeline.
//!
//! A data source is initialised once, asked for rows any number of times,
//! and closed once. `ColumnRowSource` implements this lifecycle on top of a
//! `StoreConnector`.

mod column_source;
mod row_stream;

pub use column_source::{ColumnRowSource, SourceStatus};
pub use row_stream::RowStream;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ImportError;
use column_import_repository::DataSourceProperties;
use column_import_shared::ImportContext;

/// Pull-based row source driven by the import host.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Validate configuration and acquire resources.
    ///
    /// The context is captured for later `get_data` calls.
    async fn init(
        &mut self,
        context: Arc<dyn ImportContext>,
        properties: &DataSourceProperties,
    ) -> Result<(), ImportError>;

    /// Start a fresh, independent row stream. `query` is accepted for
    /// uniformity with other sources and may be ignored.
    async fn get_data(&self, query: &str) -> Result<RowStream, ImportError>;

    /// Release resources. Safe to call more than once.
    async fn close(&mut self) -> Result<(), ImportError>;
}
