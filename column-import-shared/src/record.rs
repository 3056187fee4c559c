//! Flat row records handed to the indexer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDescriptor;

/// Synthetic key under which the row key is exposed.
pub const ROW_KEY_FIELD: &str = "rowkey";

/// One row returned by a scan, flattened to `key -> value`.
///
/// Column values are keyed `family:qualifier`; the row key itself is stored
/// under [`ROW_KEY_FIELD`]. Byte values are decoded as UTF-8, replacing
/// invalid sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
}

impl RowRecord {
    /// Create a record for the given row key.
    pub fn new(row_key: &[u8]) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            ROW_KEY_FIELD.to_string(),
            String::from_utf8_lossy(row_key).into_owned(),
        );
        Self { fields }
    }

    /// Add a cell value.
    pub fn insert_cell(&mut self, column: &ColumnDescriptor, value: &[u8]) {
        self.fields
            .insert(column.key(), String::from_utf8_lossy(value).into_owned());
    }

    /// Look up a value by record key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The row key.
    pub fn row_key(&self) -> Option<&str> {
        self.get(ROW_KEY_FIELD)
    }

    /// Number of fields, including the row key.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
