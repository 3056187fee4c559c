//! Entity processor implementation.
//!
//! Drives a data source on behalf of one import entity: the scan is started
//! on the first row request and the source is closed when the entity is
//! destroyed.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::errors::ImportError;
use crate::source::{DataSource, RowStream};
use column_import_repository::DataSourceProperties;
use column_import_shared::{ImportContext, RowRecord};

/// Row-at-a-time reader over a data source.
pub struct EntityProcessor<S: DataSource> {
    source: S,
    rows: Option<RowStream>,
    rows_processed: usize,
}

impl<S: DataSource> EntityProcessor<S> {
    /// Create a processor over the given data source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            rows: None,
            rows_processed: 0,
        }
    }

    /// Initialise the underlying data source.
    pub async fn init(
        &mut self,
        context: Arc<dyn ImportContext>,
        properties: &DataSourceProperties,
    ) -> Result<(), ImportError> {
        self.source.init(context, properties).await
    }

    /// Return the next row, or `None` once the scan is exhausted.
    ///
    /// The first call starts the scan.
    pub async fn next_row(&mut self) -> Result<Option<RowRecord>, ImportError> {
        if self.rows.is_none() {
            debug!("Starting row stream");
            self.rows = Some(self.source.get_data("").await?);
        }

        let Some(rows) = self.rows.as_mut() else {
            return Ok(None);
        };

        let next = rows.next().await.transpose()?;
        if next.is_some() {
            self.rows_processed += 1;
        }
        Ok(next)
    }

    /// Number of rows returned so far.
    pub fn rows_processed(&self) -> usize {
        self.rows_processed
    }

    /// The underlying data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Abandon any in-flight scan and close the data source.
    #[instrument(skip(self))]
    pub async fn destroy(&mut self) -> Result<(), ImportError> {
        self.rows = None;
        info!(rows = self.rows_processed, "Destroying entity processor");
        self.source.close().await
    }
}
