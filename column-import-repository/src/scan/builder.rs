//! Scan builder.
//!
//! Builds a `ScanDescriptor` from the entity configuration: the `columns`
//! list becomes the projection, the `required` list becomes a conjunction of
//! not-empty predicates, and `caching` / `timeout_ms` become scan options.

use std::time::Duration;

use tracing::debug;

use column_import_shared::{ColumnDescriptor, ConfigurationError, ImportContext};

use crate::scan::descriptor::{ScanDescriptor, ScanOptions};
use crate::scan::filter::{FilterList, FilterOperator, SingleColumnValueFilter};

/// Configuration key listing the projected columns.
pub const COLUMNS: &str = "columns";
/// Configuration key listing the columns every returned row must carry.
pub const REQUIRED: &str = "required";
/// Entity attribute with the number of rows fetched per round trip.
pub const CACHING: &str = "caching";
/// Entity attribute with the per-advance timeout in milliseconds.
pub const TIMEOUT_MS: &str = "timeout_ms";

/// Produces the scan a data source executes.
///
/// Implementations can be injected into the data source to customise the scan
/// without touching the lifecycle code.
pub trait ScanFactory: Send + Sync {
    /// Build a scan from the entity configuration.
    fn create(&self, context: &dyn ImportContext) -> Result<ScanDescriptor, ConfigurationError>;
}

/// The default scan factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanBuilder;

impl ScanBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    /// Build a scan from the entity configuration.
    ///
    /// Both lists are optional. Without `columns` the scan projects every
    /// column; without `required` the filter accepts every row.
    pub fn build<C>(&self, context: &C) -> Result<ScanDescriptor, ConfigurationError>
    where
        C: ImportContext + ?Sized,
    {
        let columns = ColumnDescriptor::parse_list(COLUMNS, context)?;
        let filter = Self::required_filter(ColumnDescriptor::parse_list(REQUIRED, context)?);
        let options = ScanOptions {
            caching: Self::positive_attribute(context, CACHING)?
                .map(|v| usize::try_from(v).unwrap_or(usize::MAX)),
            timeout: Self::positive_attribute(context, TIMEOUT_MS)?.map(Duration::from_millis),
        };

        debug!(
            columns = columns.len(),
            required = filter.filters().len(),
            caching = ?options.caching,
            timeout = ?options.timeout,
            "Built scan descriptor"
        );

        Ok(ScanDescriptor::new(columns, filter, options))
    }

    fn required_filter(required: Vec<ColumnDescriptor>) -> FilterList {
        let filters = required
            .into_iter()
            .map(SingleColumnValueFilter::not_empty)
            .collect();

        FilterList::new(FilterOperator::MustPassAll, filters)
    }

    fn positive_attribute<C>(context: &C, key: &str) -> Result<Option<u64>, ConfigurationError>
    where
        C: ImportContext + ?Sized,
    {
        let Some(raw) = context.entity_attribute(key) else {
            return Ok(None);
        };

        match raw.trim().parse::<u64>() {
            Ok(0) => Err(ConfigurationError::invalid_value(
                key,
                raw,
                "must be greater than zero",
            )),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(ConfigurationError::invalid_value(key, raw, e.to_string())),
        }
    }
}

impl ScanFactory for ScanBuilder {
    fn create(&self, context: &dyn ImportContext) -> Result<ScanDescriptor, ConfigurationError> {
        self.build(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::CompareOp;
    use crate::types::StoreRow;
    use column_import_shared::EntityContext;

    #[test]
    fn test_columns_without_required() {
        let ctx = EntityContext::new().with_list(COLUMNS, ["cf.a", "cf.b"]);
        let scan = ScanBuilder::new().build(&ctx).unwrap();

        assert_eq!(
            scan.columns(),
            &[ColumnDescriptor::new("cf", "a"), ColumnDescriptor::new("cf", "b")]
        );
        assert_eq!(
            scan.columns().iter().map(|c| c.key()).collect::<Vec<_>>(),
            vec!["cf:a", "cf:b"]
        );
        assert!(scan.filter().is_empty());
        assert!(scan.accepts(&StoreRow::new("any")));
    }

    #[test]
    fn test_empty_configuration_projects_all_and_accepts_all() {
        let scan = ScanBuilder::new().build(&EntityContext::new()).unwrap();

        assert!(scan.projects_all());
        assert!(scan.filter().is_empty());
        assert_eq!(scan.filter().operator(), FilterOperator::MustPassAll);
        assert!(scan.accepts(&StoreRow::new("r")));
        assert!(scan.accepts(&StoreRow::new("r").with_cell("cf", "a", "")));
        assert_eq!(scan.options(), &ScanOptions::default());
        assert_eq!(scan, ScanDescriptor::full());
    }

    #[test]
    fn test_lists_are_independent() {
        let only_required = EntityContext::new().with_list(REQUIRED, ["cf.flag"]);
        let scan = ScanBuilder::new().build(&only_required).unwrap();
        assert!(scan.projects_all());
        assert_eq!(scan.filter().filters().len(), 1);
    }

    #[test]
    fn test_required_builds_not_empty_conjunction() {
        let ctx = EntityContext::new().with_list(REQUIRED, ["cf.flag", "meta.id"]);
        let scan = ScanBuilder::new().build(&ctx).unwrap();

        assert_eq!(scan.filter().operator(), FilterOperator::MustPassAll);
        for filter in scan.filter().filters() {
            assert_eq!(filter.op(), CompareOp::NotEqual);
            assert!(filter.value().is_empty());
            assert!(filter.is_filter_if_missing());
        }

        let complete = StoreRow::new("r1")
            .with_cell("cf", "flag", "y")
            .with_cell("meta", "id", "7");
        let missing = StoreRow::new("r2").with_cell("cf", "flag", "y");
        let empty = StoreRow::new("r3")
            .with_cell("cf", "flag", "")
            .with_cell("meta", "id", "7");

        assert!(scan.accepts(&complete));
        assert!(!scan.accepts(&missing));
        assert!(!scan.accepts(&empty));
    }

    #[test]
    fn test_malformed_entry_propagates() {
        let ctx = EntityContext::new().with_list(COLUMNS, ["badentry"]);
        let err = ScanBuilder::new().build(&ctx).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedColumn { ref entry, .. } if entry == "badentry"));

        let ctx = EntityContext::new().with_list(REQUIRED, ["cf.ok", "nodelimiter"]);
        assert!(ScanBuilder::new().build(&ctx).is_err());
    }

    #[test]
    fn test_scan_options() {
        let ctx = EntityContext::new()
            .with_attribute(CACHING, "50")
            .with_attribute(TIMEOUT_MS, "1500");
        let scan = ScanBuilder::new().build(&ctx).unwrap();

        assert_eq!(scan.options().caching, Some(50));
        assert_eq!(scan.options().timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_scan_options_reject_invalid_values() {
        let zero = EntityContext::new().with_attribute(CACHING, "0");
        assert!(ScanBuilder::new().build(&zero).is_err());

        let text = EntityContext::new().with_attribute(TIMEOUT_MS, "soon");
        let err = ScanBuilder::new().build(&text).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref key, .. } if key == TIMEOUT_MS));
    }

    #[test]
    fn test_factory_object() {
        let factory: Box<dyn ScanFactory> = Box::new(ScanBuilder::new());
        let ctx = EntityContext::new().with_list(COLUMNS, ["cf.a"]);
        let scan = factory.create(&ctx).unwrap();
        assert_eq!(scan.columns().len(), 1);
    }
}
