//! The scan request handed to the store.

use std::time::Duration;

use column_import_shared::ColumnDescriptor;

use crate::scan::filter::FilterList;
use crate::types::StoreRow;

/// Client-side options passed through with a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Rows fetched from the store per round trip. `None` leaves the choice
    /// to the store client.
    pub caching: Option<usize>,
    /// Upper bound on a single advance of the scan.
    pub timeout: Option<Duration>,
}

/// A scan request: projected columns, a row filter and client options.
///
/// Built once and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDescriptor {
    columns: Vec<ColumnDescriptor>,
    filter: FilterList,
    options: ScanOptions,
}

impl ScanDescriptor {
    /// Create a descriptor. An empty column list projects every column.
    pub fn new(columns: Vec<ColumnDescriptor>, filter: FilterList, options: ScanOptions) -> Self {
        Self {
            columns,
            filter,
            options,
        }
    }

    /// A scan over every column and every row.
    pub fn full() -> Self {
        Self::new(Vec::new(), FilterList::accept_all(), ScanOptions::default())
    }

    /// The projected columns, in configuration order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Whether the scan returns every column.
    pub fn projects_all(&self) -> bool {
        self.columns.is_empty()
    }

    /// The row filter.
    pub fn filter(&self) -> &FilterList {
        &self.filter
    }

    /// The client options.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Whether the store should return this row.
    pub fn accepts(&self, row: &StoreRow) -> bool {
        self.filter.matches(row)
    }
}
