//! Row filters evaluated by the store.

use column_import_shared::ColumnDescriptor;

use crate::types::StoreRow;

/// Comparison applied between a cell value and a reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Cell value equals the reference.
    Equal,
    /// Cell value differs from the reference.
    NotEqual,
}

impl CompareOp {
    fn evaluate(self, cell: &[u8], reference: &[u8]) -> bool {
        match self {
            CompareOp::Equal => cell == reference,
            CompareOp::NotEqual => cell != reference,
        }
    }
}

/// Tests the value of a single column.
///
/// Values are compared byte for byte; no trimming or case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleColumnValueFilter {
    column: ColumnDescriptor,
    op: CompareOp,
    value: Vec<u8>,
    filter_if_missing: bool,
}

impl SingleColumnValueFilter {
    /// Create a filter. Rows lacking the column pass unless
    /// [`filter_if_missing`](Self::filter_if_missing) is set.
    pub fn new(column: ColumnDescriptor, op: CompareOp, value: impl Into<Vec<u8>>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
            filter_if_missing: false,
        }
    }

    /// Predicate "column is present and its value is not empty".
    pub fn not_empty(column: ColumnDescriptor) -> Self {
        Self::new(column, CompareOp::NotEqual, Vec::new()).filter_if_missing(true)
    }

    /// Exclude rows that lack the column.
    pub fn filter_if_missing(mut self, filter_if_missing: bool) -> Self {
        self.filter_if_missing = filter_if_missing;
        self
    }

    /// The tested column.
    pub fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    /// The comparison.
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// The reference value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Whether rows lacking the column are excluded.
    pub fn is_filter_if_missing(&self) -> bool {
        self.filter_if_missing
    }

    /// Whether the row passes.
    pub fn matches(&self, row: &StoreRow) -> bool {
        match row.cell(&self.column) {
            Some(cell) => self.op.evaluate(cell, &self.value),
            None => !self.filter_if_missing,
        }
    }
}

/// How the filters of a `FilterList` combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Logical AND. An empty list passes every row.
    MustPassAll,
    /// Logical OR. An empty list passes every row.
    MustPassOne,
}

/// A list of filters combined with one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterList {
    operator: FilterOperator,
    filters: Vec<SingleColumnValueFilter>,
}

impl FilterList {
    /// Create a list with the given operator and filters.
    pub fn new(operator: FilterOperator, filters: Vec<SingleColumnValueFilter>) -> Self {
        Self { operator, filters }
    }

    /// An empty conjunction, which accepts every row.
    pub fn accept_all() -> Self {
        Self::new(FilterOperator::MustPassAll, Vec::new())
    }

    /// The combination operator.
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// The filters, in insertion order.
    pub fn filters(&self) -> &[SingleColumnValueFilter] {
        &self.filters
    }

    /// Whether the list holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether the row passes the list.
    pub fn matches(&self, row: &StoreRow) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        match self.operator {
            FilterOperator::MustPassAll => self.filters.iter().all(|f| f.matches(row)),
            FilterOperator::MustPassOne => self.filters.iter().any(|f| f.matches(row)),
        }
    }
}

impl Default for FilterList {
    fn default() -> Self {
        Self::accept_all()
    }
}
