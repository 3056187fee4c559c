//! Data source backed by a column-family store.
//!
//! `ColumnRowSource` opens a connection and a table handle on `init`, runs a
//! scan built from the entity configuration on every `get_data`, and
//! releases the table and then the connection on `close`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::errors::ImportError;
use crate::source::{DataSource, RowStream};
use column_import_repository::{
    DataSourceProperties, ScanBuilder, ScanFactory, SourceSettings, StoreConnection,
    StoreConnector, StoreError, StoreTable,
};
use column_import_shared::ImportContext;

/// Lifecycle state of a `ColumnRowSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Not initialised, or the last `init` failed.
    Uninitialized,
    /// Connection and table handle are open.
    Open,
    /// Resources were released. Terminal.
    Closed,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceStatus::Uninitialized => "uninitialized",
            SourceStatus::Open => "open",
            SourceStatus::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Owns an open connection. If dropped before `close` finishes, the
/// connection is closed on a background task.
struct ConnectionGuard {
    connection: Option<Box<dyn StoreConnection>>,
}

impl ConnectionGuard {
    fn new(connection: Box<dyn StoreConnection>) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    async fn table(&self, name: &str) -> Result<Box<dyn StoreTable>, StoreError> {
        match &self.connection {
            Some(connection) => connection.table(name).await,
            None => Err(StoreError::ConnectionClosed),
        }
    }

    /// The connection stays guarded until its close completes.
    async fn close(&mut self) -> Result<(), StoreError> {
        let result = match &self.connection {
            Some(connection) => connection.close().await,
            None => Ok(()),
        };
        self.connection = None;
        result
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Closing abandoned connection in the background");
                handle.spawn(async move {
                    if let Err(e) = connection.close().await {
                        warn!(error = %e, "Failed to close abandoned connection");
                    }
                });
            }
            Err(_) => warn!("Connection dropped outside a runtime without close"),
        }
    }
}

/// Resources held while the source is open. `table` is taken once its
/// release has started; the connection is released last.
struct OpenSource {
    context: Arc<dyn ImportContext>,
    settings: SourceSettings,
    connection: ConnectionGuard,
    table: Option<Box<dyn StoreTable>>,
    table_error: Option<StoreError>,
}

enum SourceState {
    Uninitialized,
    Open(OpenSource),
    Closed,
}

/// Pull-based row source over one store table.
///
/// # Example
///
/// ```ignore
/// let connector = Arc::new(MemoryConnector::new(store));
/// let mut source = ColumnRowSource::new(connector);
/// source.init(context, &properties).await?;
///
/// let mut rows = source.get_data("").await?;
/// while let Some(record) = rows.next().await {
///     index(record?);
/// }
///
/// source.close().await?;
/// ```
pub struct ColumnRowSource {
    connector: Arc<dyn StoreConnector>,
    scan_factory: Arc<dyn ScanFactory>,
    state: SourceState,
}

impl ColumnRowSource {
    /// Create a source that connects through `connector` and builds scans
    /// with the default `ScanBuilder`.
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            scan_factory: Arc::new(ScanBuilder::new()),
            state: SourceState::Uninitialized,
        }
    }

    /// Use a custom scan factory.
    pub fn with_scan_factory(mut self, scan_factory: Arc<dyn ScanFactory>) -> Self {
        self.scan_factory = scan_factory;
        self
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SourceStatus {
        match self.state {
            SourceState::Uninitialized => SourceStatus::Uninitialized,
            SourceState::Open(_) => SourceStatus::Open,
            SourceState::Closed => SourceStatus::Closed,
        }
    }

    /// Name of the open table, if any.
    pub fn table_name(&self) -> Option<&str> {
        match &self.state {
            SourceState::Open(open) => Some(open.settings.table.as_str()),
            _ => None,
        }
    }
}

#[async_trait]
impl DataSource for ColumnRowSource {
    #[instrument(skip(self, context, properties))]
    async fn init(
        &mut self,
        context: Arc<dyn ImportContext>,
        properties: &DataSourceProperties,
    ) -> Result<(), ImportError> {
        if !matches!(self.state, SourceState::Uninitialized) {
            return Err(ImportError::invalid_state("init", self.status()));
        }

        let settings = SourceSettings::resolve(context.as_ref(), properties)?;

        let mut connection = self
            .connector
            .connect(&settings.connection)
            .await
            .map(ConnectionGuard::new)
            .map_err(|e| {
                ImportError::connection(
                    format!(
                        "failed to connect to {}:{}",
                        settings.connection.quorum, settings.connection.client_port
                    ),
                    e,
                )
            })?;

        let table = match connection.table(&settings.table).await {
            Ok(table) => table,
            Err(e) => {
                let err =
                    ImportError::connection(format!("failed to open table {}", settings.table), e);
                return Err(match connection.close().await {
                    Ok(()) => err,
                    Err(close_err) => {
                        warn!(
                            error = %close_err,
                            "Failed to close connection after table open failure"
                        );
                        err.with_suppressed(close_err)
                    }
                });
            }
        };

        info!(
            table = %settings.table,
            quorum = %settings.connection.quorum,
            port = settings.connection.client_port,
            "Opened column row source"
        );

        self.state = SourceState::Open(OpenSource {
            context,
            settings,
            connection,
            table: Some(table),
            table_error: None,
        });

        Ok(())
    }

    #[instrument(skip(self, _query))]
    async fn get_data(&self, _query: &str) -> Result<RowStream, ImportError> {
        let SourceState::Open(open) = &self.state else {
            return Err(ImportError::invalid_state("get_data", self.status()));
        };

        let scan = self.scan_factory.create(open.context.as_ref())?;

        let Some(table) = &open.table else {
            return Err(ImportError::scan(
                format!("cannot scan {} while closing", open.settings.table),
                StoreError::TableClosed(open.settings.table.clone()),
            ));
        };

        let scanner = table.scan(&scan).await.map_err(|e| {
            ImportError::scan(format!("failed to start scan of {}", open.settings.table), e)
        })?;

        debug!(
            table = %open.settings.table,
            columns = scan.columns().len(),
            required = scan.filter().filters().len(),
            "Started scan"
        );

        Ok(RowStream::new(
            scanner,
            open.settings.table.clone(),
            scan.options().timeout,
        ))
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<(), ImportError> {
        let SourceState::Open(open) = &mut self.state else {
            return Ok(());
        };

        // Resources leave the state only once released, so an interrupted
        // close can be retried.
        if let Some(table) = open.table.take() {
            if let Err(e) = table.close().await {
                open.table_error = Some(e);
            }
        }
        let connection_result = open.connection.close().await;
        let table_result = open.table_error.take();
        let table_name = open.settings.table.clone();
        self.state = SourceState::Closed;

        match (table_result, connection_result) {
            (None, Ok(())) => {
                info!(table = %table_name, "Closed column row source");
                Ok(())
            }
            (Some(table_err), Ok(())) => {
                warn!(table = %table_name, error = %table_err, "Failed to close table");
                Err(ImportError::close(table_err, None))
            }
            (None, Err(connection_err)) => {
                warn!(error = %connection_err, "Failed to close connection");
                Err(ImportError::close(connection_err, None))
            }
            (Some(table_err), Err(connection_err)) => {
                warn!(
                    table = %table_name,
                    table_error = %table_err,
                    connection_error = %connection_err,
                    "Failed to close table and connection"
                );
                Err(ImportError::close(connection_err, Some(table_err)))
            }
        }
    }
}

impl Drop for ColumnRowSource {
    fn drop(&mut self) {
        if let SourceState::Open(open) = &self.state {
            warn!(table = %open.settings.table, "Column row source dropped without close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use column_import_repository::config::{PARENT_NODE, PORT, TABLE, ZOOKEEPER};
    use column_import_repository::memory::FailurePlan;
    use column_import_repository::scan::{COLUMNS, REQUIRED};
    use column_import_repository::scan::CACHING;
    use column_import_repository::{
        ConnectionConfig, MemoryConnector, MemoryStore, ResultScanner, ScanDescriptor, StoreRow,
    };
    use column_import_shared::{ConfigurationError, EntityContext, RowRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn properties() -> DataSourceProperties {
        DataSourceProperties::new()
            .with(ZOOKEEPER, "zk")
            .with(PORT, "2181")
            .with(PARENT_NODE, "/hbase")
    }

    fn context() -> EntityContext {
        EntityContext::new().with_attribute(TABLE, "docs")
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .put(
                "docs",
                StoreRow::new("doc-1")
                    .with_cell("cf", "title", "First")
                    .with_cell("cf", "flag", "y")
                    .with_cell("cf", "body", "one"),
            )
            .await;
        store
            .put(
                "docs",
                StoreRow::new("doc-2")
                    .with_cell("cf", "title", "Second")
                    .with_cell("cf", "flag", ""),
            )
            .await;
        store
            .put("docs", StoreRow::new("doc-3").with_cell("cf", "title", "Third"))
            .await;
        store
    }

    async fn open_source(
        connector: MemoryConnector,
        context: EntityContext,
    ) -> ColumnRowSource {
        let mut source = ColumnRowSource::new(Arc::new(connector));
        source.init(Arc::new(context), &properties()).await.unwrap();
        source
    }

    async fn drain(rows: &mut RowStream) -> Vec<RowRecord> {
        let mut records = Vec::new();
        while let Some(record) = rows.next().await {
            records.push(record.unwrap());
        }
        records
    }

    #[tokio::test]
    async fn test_init_opens_connection_and_table() {
        let connector = MemoryConnector::new(store().await);
        let stats = connector.stats();
        let source = open_source(connector, context()).await;

        assert_eq!(source.status(), SourceStatus::Open);
        assert_eq!(source.table_name(), Some("docs"));
        assert_eq!(stats.connections_opened(), 1);
        assert_eq!(stats.tables_opened(), 1);
    }

    #[tokio::test]
    async fn test_init_names_missing_key() {
        let mut source = ColumnRowSource::new(Arc::new(MemoryConnector::new(store().await)));
        let properties = DataSourceProperties::new()
            .with(ZOOKEEPER, "zk")
            .with(PARENT_NODE, "/hbase");

        let err = source
            .init(Arc::new(context()), &properties)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Configuration(ConfigurationError::MissingKeys(ref keys)) if keys == &vec![PORT.to_string()]
        ));
        assert_eq!(source.status(), SourceStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_init_names_missing_table() {
        let connector = MemoryConnector::new(store().await);
        let stats = connector.stats();
        let mut source = ColumnRowSource::new(Arc::new(connector));

        let err = source
            .init(Arc::new(EntityContext::new()), &properties())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Configuration(ConfigurationError::MissingKeys(ref keys)) if keys == &vec![TABLE.to_string()]
        ));
        assert_eq!(source.status(), SourceStatus::Uninitialized);
        assert_eq!(stats.connections_opened(), 0);
    }

    #[tokio::test]
    async fn test_init_connect_failure() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            connect: true,
            ..Default::default()
        });
        let mut source = ColumnRowSource::new(Arc::new(connector));

        let err = source
            .init(Arc::new(context()), &properties())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Connection { source: StoreError::Io(_), .. }));
        assert_eq!(source.status(), SourceStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_init_table_failure_closes_connection() {
        let connector = MemoryConnector::new(store().await);
        let stats = connector.stats();
        let mut source = ColumnRowSource::new(Arc::new(connector));

        let missing_table = EntityContext::new().with_attribute(TABLE, "missing");
        let err = source
            .init(Arc::new(missing_table), &properties())
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Connection { source: StoreError::TableNotFound(_), .. }));
        assert_eq!(source.status(), SourceStatus::Uninitialized);
        assert_eq!(stats.connections_opened(), 1);
        assert_eq!(stats.connections_closed(), 1);

        source.close().await.unwrap();
        assert_eq!(source.status(), SourceStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_init_table_failure_keeps_connection_close_error() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            open_table: true,
            close_connection: true,
            ..Default::default()
        });
        let stats = connector.stats();
        let mut source = ColumnRowSource::new(Arc::new(connector));

        let err = source
            .init(Arc::new(context()), &properties())
            .await
            .unwrap_err();
        match err {
            ImportError::Connection {
                source: StoreError::Io(_),
                suppressed: Some(suppressed),
                ..
            } => assert!(suppressed.to_string().contains("connection close failed")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stats.connections_closed(), 1);
        assert_eq!(source.status(), SourceStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_get_data_projects_columns() {
        let ctx = context().with_list(COLUMNS, ["cf.title"]);
        let mut source = open_source(MemoryConnector::new(store().await), ctx).await;

        let mut rows = source.get_data("ignored").await.unwrap();
        let records = drain(&mut rows).await;

        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.len(), 2);
            assert!(record.get("cf:title").is_some());
        }

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_data_filters_required_columns() {
        let ctx = context().with_list(REQUIRED, ["cf.flag"]);
        let mut source = open_source(MemoryConnector::new(store().await), ctx).await;

        let mut rows = source.get_data("").await.unwrap();
        let records = drain(&mut rows).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row_key(), Some("doc-1"));
        assert_eq!(records[0].get("cf:body"), Some("one"));

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_data_without_configuration_returns_everything() {
        let mut source = open_source(MemoryConnector::new(store().await), context()).await;

        let mut rows = source.get_data("").await.unwrap();
        let records = drain(&mut rows).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].len(), 4);

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_data_twice_is_independent() {
        let connector = MemoryConnector::new(store().await);
        let stats = connector.stats();
        let mut source = open_source(connector, context()).await;

        let mut first = source.get_data("").await.unwrap();
        let mut second = source.get_data("").await.unwrap();

        let first_records = drain(&mut first).await;
        assert!(first.is_exhausted());
        let second_records = drain(&mut second).await;

        assert_eq!(first_records, second_records);
        assert_eq!(second_records.len(), 3);
        assert_eq!(stats.scans_started(), 2);

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_data_malformed_column() {
        let ctx = context().with_list(COLUMNS, ["badentry"]);
        let mut source = open_source(MemoryConnector::new(store().await), ctx).await;

        let err = source.get_data("").await.unwrap_err();
        assert!(matches!(err, ImportError::Configuration(_)));
        assert!(err.to_string().contains("badentry"));

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_data_requires_open() {
        let mut source = ColumnRowSource::new(Arc::new(MemoryConnector::new(store().await)));
        let err = source.get_data("").await.unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidState { state: SourceStatus::Uninitialized, .. }
        ));

        source.init(Arc::new(context()), &properties()).await.unwrap();
        source.close().await.unwrap();

        let err = source.get_data("").await.unwrap_err();
        assert!(matches!(err, ImportError::InvalidState { state: SourceStatus::Closed, .. }));
    }

    #[tokio::test]
    async fn test_get_data_scan_start_failure() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            start_scan: true,
            ..Default::default()
        });
        let mut source = open_source(connector, context()).await;

        let err = source.get_data("").await.unwrap_err();
        assert!(matches!(err, ImportError::Scan { source: StoreError::Server(_), .. }));

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_mid_scan_failure_exhausts_stream() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            fail_after_rows: Some(1),
            ..Default::default()
        });
        let mut source = open_source(connector, context()).await;

        let mut rows = source.get_data("").await.unwrap();
        assert!(rows.next().await.unwrap().is_ok());
        assert!(matches!(rows.next().await, Some(Err(ImportError::Scan { .. }))));
        assert!(rows.next().await.is_none());

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_during_iteration_abandons_scan() {
        let mut source = open_source(MemoryConnector::new(store().await), context()).await;

        let mut rows = source.get_data("").await.unwrap();
        assert!(rows.next().await.unwrap().is_ok());

        source.close().await.unwrap();

        assert!(matches!(rows.next().await, Some(Err(ImportError::Scan { .. }))));
        assert!(rows.is_exhausted());
    }

    #[tokio::test]
    async fn test_close_releases_table_then_connection() {
        let connector = MemoryConnector::new(store().await);
        let stats = connector.stats();
        let mut source = open_source(connector, context()).await;

        source.close().await.unwrap();

        assert_eq!(source.status(), SourceStatus::Closed);
        assert_eq!(stats.tables_closed(), 1);
        assert_eq!(stats.connections_closed(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut never_opened = ColumnRowSource::new(Arc::new(MemoryConnector::new(store().await)));
        never_opened.close().await.unwrap();
        never_opened.close().await.unwrap();

        let connector = MemoryConnector::new(store().await);
        let stats = connector.stats();
        let mut source = open_source(connector, context()).await;
        source.close().await.unwrap();
        source.close().await.unwrap();

        assert_eq!(stats.connections_closed(), 1);
        assert_eq!(stats.tables_closed(), 1);
    }

    #[tokio::test]
    async fn test_close_table_failure_still_closes_connection() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            close_table: true,
            ..Default::default()
        });
        let stats = connector.stats();
        let mut source = open_source(connector, context()).await;

        let err = source.close().await.unwrap_err();
        assert!(matches!(err, ImportError::Close { suppressed: None, .. }));
        assert_eq!(stats.connections_closed(), 1);
        assert_eq!(source.status(), SourceStatus::Closed);

        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_connection_failure_only() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            close_connection: true,
            ..Default::default()
        });
        let stats = connector.stats();
        let mut source = open_source(connector, context()).await;

        let err = source.close().await.unwrap_err();
        match err {
            ImportError::Close {
                primary,
                suppressed: None,
            } => assert!(primary.to_string().contains("connection close failed")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stats.tables_closed(), 1);
        assert_eq!(source.status(), SourceStatus::Closed);
    }

    #[tokio::test]
    async fn test_close_reports_both_failures() {
        let connector = MemoryConnector::new(store().await).with_failures(FailurePlan {
            close_table: true,
            close_connection: true,
            ..Default::default()
        });
        let mut source = open_source(connector, context()).await;

        let err = source.close().await.unwrap_err();
        match err {
            ImportError::Close {
                primary,
                suppressed: Some(suppressed),
            } => {
                assert!(primary.to_string().contains("connection close failed"));
                assert!(suppressed.to_string().contains("failed to close table docs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_init_after_close_is_rejected() {
        let mut source = open_source(MemoryConnector::new(store().await), context()).await;
        source.close().await.unwrap();

        let err = source
            .init(Arc::new(context()), &properties())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidState { state: SourceStatus::Closed, .. }));
    }

    #[tokio::test]
    async fn test_huge_caching_scans_normally() {
        let ctx = context().with_attribute(CACHING, "100000000000000000");
        let mut source = open_source(MemoryConnector::new(store().await), ctx).await;

        let mut rows = source.get_data("").await.unwrap();
        let records = drain(&mut rows).await;
        assert_eq!(records.len(), 3);

        source.close().await.unwrap();
    }

    /// Connector whose table handles can stall on open or close.
    #[derive(Default)]
    struct StallingConnector {
        stall_open: bool,
        stall_close: bool,
        connection_closes: Arc<AtomicUsize>,
    }

    struct StallingConnection {
        stall_open: bool,
        stall_close: bool,
        closes: Arc<AtomicUsize>,
    }

    struct StallingTable {
        stall_close: bool,
    }

    #[async_trait]
    impl StoreConnector for StallingConnector {
        async fn connect(
            &self,
            _config: &ConnectionConfig,
        ) -> Result<Box<dyn StoreConnection>, StoreError> {
            Ok(Box::new(StallingConnection {
                stall_open: self.stall_open,
                stall_close: self.stall_close,
                closes: self.connection_closes.clone(),
            }))
        }
    }

    #[async_trait]
    impl StoreConnection for StallingConnection {
        async fn table(&self, _name: &str) -> Result<Box<dyn StoreTable>, StoreError> {
            if self.stall_open {
                futures::future::pending::<()>().await;
            }
            Ok(Box::new(StallingTable {
                stall_close: self.stall_close,
            }))
        }

        async fn close(&self) -> Result<(), StoreError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl StoreTable for StallingTable {
        fn name(&self) -> &str {
            "docs"
        }

        async fn scan(&self, _scan: &ScanDescriptor) -> Result<Box<dyn ResultScanner>, StoreError> {
            Err(StoreError::server("not supported"))
        }

        async fn close(&self) -> Result<(), StoreError> {
            if self.stall_close {
                futures::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_close_can_be_retried() {
        let connector = StallingConnector {
            stall_close: true,
            ..Default::default()
        };
        let closes = connector.connection_closes.clone();
        let mut source = ColumnRowSource::new(Arc::new(connector));
        source.init(Arc::new(context()), &properties()).await.unwrap();

        let interrupted = tokio::time::timeout(Duration::from_millis(100), source.close()).await;
        assert!(interrupted.is_err());
        assert_eq!(source.status(), SourceStatus::Open);
        assert_eq!(closes.load(Ordering::SeqCst), 0);

        let err = source.get_data("").await.unwrap_err();
        assert!(matches!(err, ImportError::Scan { source: StoreError::TableClosed(_), .. }));

        source.close().await.unwrap();
        assert_eq!(source.status(), SourceStatus::Closed);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_source_closes_connection() {
        let connector = StallingConnector {
            stall_close: true,
            ..Default::default()
        };
        let closes = connector.connection_closes.clone();
        let mut source = ColumnRowSource::new(Arc::new(connector));
        source.init(Arc::new(context()), &properties()).await.unwrap();

        let interrupted = tokio::time::timeout(Duration::from_millis(100), source.close()).await;
        assert!(interrupted.is_err());
        drop(source);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_init_closes_connection() {
        let connector = StallingConnector {
            stall_open: true,
            ..Default::default()
        };
        let closes = connector.connection_closes.clone();
        let mut source = ColumnRowSource::new(Arc::new(connector));

        let interrupted = tokio::time::timeout(
            Duration::from_millis(100),
            source.init(Arc::new(context()), &properties()),
        )
        .await;
        assert!(interrupted.is_err());
        assert_eq!(source.status(), SourceStatus::Uninitialized);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    /// Factory that always scans a fixed column.
    struct TitleOnly;

    impl ScanFactory for TitleOnly {
        fn create(
            &self,
            _context: &dyn ImportContext,
        ) -> Result<ScanDescriptor, ConfigurationError> {
            Ok(ScanDescriptor::new(
                vec![column_import_shared::ColumnDescriptor::new("cf", "title")],
                Default::default(),
                Default::default(),
            ))
        }
    }

    #[tokio::test]
    async fn test_custom_scan_factory() {
        let mut source = ColumnRowSource::new(Arc::new(MemoryConnector::new(store().await)))
            .with_scan_factory(Arc::new(TitleOnly));
        source.init(Arc::new(context()), &properties()).await.unwrap();

        let mut rows = source.get_data("").await.unwrap();
        let records = drain(&mut rows).await;
        assert!(records.iter().all(|r| r.len() == 2));

        source.close().await.unwrap();
    }
}
