//! Row types returned by store scans.

use std::collections::BTreeMap;

use column_import_shared::{ColumnDescriptor, RowRecord};

/// A row as returned by the store: its key and the cells it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreRow {
    /// The row key.
    pub key: Vec<u8>,
    /// Cell values by column, ordered by family then qualifier.
    pub cells: BTreeMap<ColumnDescriptor, Vec<u8>>,
}

impl StoreRow {
    /// Create an empty row with the given key.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Add a cell.
    pub fn with_cell(
        mut self,
        family: &str,
        qualifier: &str,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.cells
            .insert(ColumnDescriptor::new(family, qualifier), value.into());
        self
    }

    /// Look up a cell value.
    pub fn cell(&self, column: &ColumnDescriptor) -> Option<&[u8]> {
        self.cells.get(column).map(Vec::as_slice)
    }

    /// Keep only the listed columns. An empty list keeps every column.
    pub fn project(&self, columns: &[ColumnDescriptor]) -> StoreRow {
        if columns.is_empty() {
            return self.clone();
        }

        let cells = columns
            .iter()
            .filter_map(|column| {
                self.cells
                    .get(column)
                    .map(|value| (column.clone(), value.clone()))
            })
            .collect();

        StoreRow {
            key: self.key.clone(),
            cells,
        }
    }

    /// Flatten into the record shape handed to the indexer.
    pub fn into_record(self) -> RowRecord {
        let mut record = RowRecord::new(&self.key);
        for (column, value) in &self.cells {
            record.insert_cell(column, value);
        }
        record
    }
}
