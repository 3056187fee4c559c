//! Dependency initialization and wiring for the importer.

use std::sync::Arc;

use tracing::info;

use crate::config::ImportConfig;
use crate::ImporterError;
use column_import_pipeline::{ColumnRowSource, EntityProcessor};
use column_import_repository::memory::TableSnapshot;
use column_import_repository::{DataSourceProperties, MemoryConnector, MemoryStore};
use column_import_shared::{EntityContext, ImportContext};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Processor over the row source, not yet initialised.
    pub processor: EntityProcessor<ColumnRowSource>,
    /// Entity context handed to the row source on init.
    pub context: Arc<dyn ImportContext>,
    /// Data source properties handed to the row source on init.
    pub properties: DataSourceProperties,
}

impl Dependencies {
    /// Load the snapshot named in the configuration and wire the pipeline.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ImporterError)` - If the snapshot cannot be read or parsed
    pub async fn new(config: &ImportConfig) -> Result<Self, ImporterError> {
        let raw = tokio::fs::read_to_string(&config.snapshot_path).await?;
        let snapshot = TableSnapshot::from_json(&raw)?;
        let table = snapshot.table.clone();

        let store = MemoryStore::new();
        let rows = store.load_snapshot(snapshot).await?;

        info!(
            path = %config.snapshot_path.display(),
            table = %table,
            rows = rows,
            "Loaded table snapshot"
        );

        Ok(Self::with_store(store, config.entity.clone(), config.properties.clone()))
    }

    /// Wire the pipeline over an existing store.
    pub fn with_store(
        store: MemoryStore,
        entity: EntityContext,
        properties: DataSourceProperties,
    ) -> Self {
        let connector = MemoryConnector::new(store);
        let source = ColumnRowSource::new(Arc::new(connector));

        Self {
            processor: EntityProcessor::new(source),
            context: Arc::new(entity),
            properties,
        }
    }
}
