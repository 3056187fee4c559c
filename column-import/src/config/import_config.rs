//! Importer configuration read from environment variables.

use std::env;
use std::path::PathBuf;

use crate::ImporterError;
use column_import_repository::config::{PARENT_NODE, PORT, TABLE, ZOOKEEPER};
use column_import_repository::scan::{CACHING, COLUMNS, REQUIRED, TIMEOUT_MS};
use column_import_repository::DataSourceProperties;
use column_import_shared::EntityContext;

/// Default coordination quorum.
const DEFAULT_ZOOKEEPER: &str = "localhost";

/// Default coordination client port.
const DEFAULT_PORT: &str = "2181";

/// Default parent node of the store.
const DEFAULT_PARENT_NODE: &str = "/hbase";

/// Everything needed to run one import.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Data source properties for the row source.
    pub properties: DataSourceProperties,
    /// Entity attributes: table, column lists and scan options.
    pub entity: EntityContext,
    /// JSON snapshot served by the in-memory store.
    pub snapshot_path: PathBuf,
}

impl ImportConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STORE_ZOOKEEPER`: coordination quorum (default: localhost)
    /// - `STORE_PORT`: coordination client port (default: 2181)
    /// - `STORE_PARENT_NODE`: parent node of the store (default: /hbase)
    /// - `STORE_TABLE`: table to scan
    /// - `STORE_COLUMNS`: comma-separated `family.qualifier` columns to return
    /// - `STORE_REQUIRED`: comma-separated `family.qualifier` columns every row must carry
    /// - `STORE_SCAN_CACHING`: rows fetched per round trip
    /// - `STORE_SCAN_TIMEOUT_MS`: timeout for each advance of the scan
    /// - `STORE_SNAPSHOT_PATH`: JSON table snapshot to load (required)
    pub fn from_env() -> Result<Self, ImporterError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ImporterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let properties = DataSourceProperties::new()
            .with(
                ZOOKEEPER,
                lookup("STORE_ZOOKEEPER").unwrap_or_else(|| DEFAULT_ZOOKEEPER.to_string()),
            )
            .with(
                PORT,
                lookup("STORE_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            )
            .with(
                PARENT_NODE,
                lookup("STORE_PARENT_NODE").unwrap_or_else(|| DEFAULT_PARENT_NODE.to_string()),
            );

        let mut entity = EntityContext::new();
        for (variable, attribute) in [
            ("STORE_TABLE", TABLE),
            ("STORE_COLUMNS", COLUMNS),
            ("STORE_REQUIRED", REQUIRED),
            ("STORE_SCAN_CACHING", CACHING),
            ("STORE_SCAN_TIMEOUT_MS", TIMEOUT_MS),
        ] {
            if let Some(value) = lookup(variable) {
                entity = entity.with_attribute(attribute, value);
            }
        }

        let snapshot_path = lookup("STORE_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| ImporterError::config("STORE_SNAPSHOT_PATH is not set"))?;

        Ok(Self {
            properties,
            entity,
            snapshot_path,
        })
    }
}
