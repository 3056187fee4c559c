//! JSON table snapshots for the in-memory store.
//!
//! ```json
//! {
//!   "table": "documents",
//!   "rows": [
//!     { "key": "doc-1", "cells": { "cf:title": "Hello", "cf:flag": "y" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use column_import_shared::{ColumnDescriptor, ConfigurationError};

use crate::memory::store::MemoryStore;
use crate::types::StoreRow;

/// One row of a snapshot. Cell keys are `family:qualifier`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSnapshot {
    pub key: String,
    #[serde(default)]
    pub cells: BTreeMap<String, String>,
}

/// The contents of one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table: String,
    #[serde(default)]
    pub rows: Vec<RowSnapshot>,
}

impl TableSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert into store rows, validating cell keys.
    pub fn into_rows(self) -> Result<Vec<StoreRow>, ConfigurationError> {
        self.rows
            .into_iter()
            .map(|row| {
                let mut store_row = StoreRow::new(row.key);
                for (key, value) in row.cells {
                    let column = parse_cell_key(&key)?;
                    store_row.cells.insert(column, value.into_bytes());
                }
                Ok(store_row)
            })
            .collect()
    }
}

fn parse_cell_key(key: &str) -> Result<ColumnDescriptor, ConfigurationError> {
    match key.split_once(':') {
        Some((family, qualifier)) if !family.is_empty() && !qualifier.is_empty() => {
            Ok(ColumnDescriptor::new(family, qualifier))
        }
        _ => Err(ConfigurationError::invalid_value(
            "cells",
            key,
            "expected <family>:<qualifier>",
        )),
    }
}

impl MemoryStore {
    /// Load a snapshot into the store, creating the table. Returns the
    /// number of rows loaded.
    pub async fn load_snapshot(&self, snapshot: TableSnapshot) -> Result<usize, ConfigurationError> {
        let table = snapshot.table.clone();
        let rows = snapshot.into_rows()?;
        let count = rows.len();

        self.create_table(&table).await;
        for row in rows {
            self.put(&table, row).await;
        }

        Ok(count)
    }
}
