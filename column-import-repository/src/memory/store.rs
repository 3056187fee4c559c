//! Table storage for the in-memory backend.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::scan::ScanDescriptor;
use crate::types::StoreRow;

type TableRows = BTreeMap<Vec<u8>, StoreRow>;

/// One batch of scan results.
#[derive(Debug)]
pub(crate) struct ScanBatch {
    /// Rows that passed the filter, already projected.
    pub rows: Vec<StoreRow>,
    /// Key of the last row examined, to resume from.
    pub last_key: Option<Vec<u8>>,
    /// Whether the end of the table was reached.
    pub exhausted: bool,
}

/// Tables of rows sorted by row key. Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, TableRows>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table, keeping it if it already exists.
    pub async fn create_table(&self, name: &str) {
        self.tables
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Write a row, creating the table if needed. Cells are merged into an
    /// existing row with the same key.
    pub async fn put(&self, table: &str, row: StoreRow) {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        match rows.get_mut(&row.key) {
            Some(existing) => existing.cells.extend(row.cells),
            None => {
                rows.insert(row.key.clone(), row);
            }
        }
    }

    /// Whether the table exists.
    pub async fn has_table(&self, name: &str) -> bool {
        self.tables.read().await.contains_key(name)
    }

    /// Number of rows in a table.
    pub async fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().await.get(table).map(BTreeMap::len)
    }

    /// Read up to `limit` matching rows after `after`.
    ///
    /// The filter sees the full row; projection is applied afterwards. Rows
    /// with nothing left after a non-empty projection are skipped.
    pub(crate) async fn fetch_batch(
        &self,
        table: &str,
        after: Option<&[u8]>,
        limit: usize,
        scan: &ScanDescriptor,
    ) -> Result<ScanBatch, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        let range: (Bound<Vec<u8>>, Bound<Vec<u8>>) = match after {
            Some(key) => (Bound::Excluded(key.to_vec()), Bound::Unbounded),
            None => (Bound::Unbounded, Bound::Unbounded),
        };

        let mut batch = Vec::with_capacity(limit.min(rows.len()));
        let mut last_key = None;
        let mut exhausted = true;

        for (key, row) in rows.range(range) {
            if batch.len() >= limit {
                exhausted = false;
                break;
            }

            last_key = Some(key.clone());

            if !scan.accepts(row) {
                continue;
            }

            let projected = row.project(scan.columns());
            if !scan.projects_all() && projected.cells.is_empty() {
                continue;
            }

            batch.push(projected);
        }

        Ok(ScanBatch {
            rows: batch,
            last_key,
            exhausted,
        })
    }
}
