//! Connector, connection, table and scanner for the in-memory store.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::errors::StoreError;
use crate::interfaces::{ResultScanner, StoreConnection, StoreConnector, StoreTable};
use crate::memory::store::MemoryStore;
use crate::scan::ScanDescriptor;
use crate::types::StoreRow;

/// Rows fetched per round trip when the scan does not set `caching`.
pub const DEFAULT_CACHING: usize = 100;

/// Lifecycle steps that should fail.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    /// Refuse new connections.
    pub connect: bool,
    /// Fail to open table handles.
    pub open_table: bool,
    /// Reject scans when they are started.
    pub start_scan: bool,
    /// Fail when a table handle is closed.
    pub close_table: bool,
    /// Fail when a connection is closed.
    pub close_connection: bool,
    /// Drop the scan after this many rows were delivered.
    pub fail_after_rows: Option<usize>,
}

/// Counters describing what a connector has been asked to do.
#[derive(Debug, Default)]
pub struct ConnectorStats {
    connections_opened: AtomicUsize,
    connections_closed: AtomicUsize,
    tables_opened: AtomicUsize,
    tables_closed: AtomicUsize,
    scans_started: AtomicUsize,
    last_settings: Mutex<Option<BTreeMap<String, String>>>,
}

impl ConnectorStats {
    /// Connections successfully opened.
    pub fn connections_opened(&self) -> usize {
        self.connections_opened.load(Ordering::SeqCst)
    }

    /// Connections closed.
    pub fn connections_closed(&self) -> usize {
        self.connections_closed.load(Ordering::SeqCst)
    }

    /// Table handles successfully opened.
    pub fn tables_opened(&self) -> usize {
        self.tables_opened.load(Ordering::SeqCst)
    }

    /// Table handles closed.
    pub fn tables_closed(&self) -> usize {
        self.tables_closed.load(Ordering::SeqCst)
    }

    /// Scans successfully started.
    pub fn scans_started(&self) -> usize {
        self.scans_started.load(Ordering::SeqCst)
    }

    /// Client settings of the most recent connection attempt.
    pub async fn last_settings(&self) -> Option<BTreeMap<String, String>> {
        self.last_settings.lock().await.clone()
    }
}

/// Connects to a `MemoryStore`.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: MemoryStore,
    failures: FailurePlan,
    stats: Arc<ConnectorStats>,
}

impl MemoryConnector {
    /// Create a connector for the given store.
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            failures: FailurePlan::default(),
            stats: Arc::new(ConnectorStats::default()),
        }
    }

    /// Inject failures into the lifecycle.
    pub fn with_failures(mut self, failures: FailurePlan) -> Self {
        self.failures = failures;
        self
    }

    /// Shared counters for connections, tables and scans.
    pub fn stats(&self) -> Arc<ConnectorStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn StoreConnection>, StoreError> {
        let settings = config.client_settings();
        *self.stats.last_settings.lock().await = Some(settings);

        if self.failures.connect {
            return Err(StoreError::io(format!(
                "connection refused by {}:{}",
                config.quorum, config.client_port
            )));
        }

        self.stats.connections_opened.fetch_add(1, Ordering::SeqCst);
        info!(
            quorum = %config.quorum,
            port = config.client_port,
            parent = %config.znode_parent,
            "Opened in-memory store connection"
        );

        Ok(Box::new(MemoryConnection {
            store: self.store.clone(),
            failures: self.failures.clone(),
            stats: self.stats.clone(),
            open: Arc::new(AtomicBool::new(true)),
        }))
    }
}

struct MemoryConnection {
    store: MemoryStore,
    failures: FailurePlan,
    stats: Arc<ConnectorStats>,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn table(&self, name: &str) -> Result<Box<dyn StoreTable>, StoreError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionClosed);
        }
        if self.failures.open_table {
            return Err(StoreError::io(format!("failed to locate regions of {name}")));
        }
        if !self.store.has_table(name).await {
            return Err(StoreError::TableNotFound(name.to_string()));
        }

        self.stats.tables_opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryTable {
            name: name.to_string(),
            store: self.store.clone(),
            failures: self.failures.clone(),
            stats: self.stats.clone(),
            connection_open: self.open.clone(),
            open: Arc::new(AtomicBool::new(true)),
        }))
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.open.swap(false, Ordering::SeqCst) {
            self.stats.connections_closed.fetch_add(1, Ordering::SeqCst);
        }
        if self.failures.close_connection {
            return Err(StoreError::io("connection close failed"));
        }
        Ok(())
    }
}

struct MemoryTable {
    name: String,
    store: MemoryStore,
    failures: FailurePlan,
    stats: Arc<ConnectorStats>,
    connection_open: Arc<AtomicBool>,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl StoreTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scan(&self, scan: &ScanDescriptor) -> Result<Box<dyn ResultScanner>, StoreError> {
        if !self.connection_open.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionClosed);
        }
        if !self.open.load(Ordering::SeqCst) {
            return Err(StoreError::TableClosed(self.name.clone()));
        }
        if self.failures.start_scan {
            return Err(StoreError::server(format!("scan of {} rejected", self.name)));
        }
        if !self.store.has_table(&self.name).await {
            return Err(StoreError::TableNotFound(self.name.clone()));
        }

        self.stats.scans_started.fetch_add(1, Ordering::SeqCst);
        let caching = scan.options().caching.unwrap_or(DEFAULT_CACHING).max(1);
        debug!(table = %self.name, caching = caching, "Started in-memory scan");

        Ok(Box::new(MemoryScanner {
            table: self.name.clone(),
            store: self.store.clone(),
            scan: scan.clone(),
            caching,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
            closed: false,
            delivered: 0,
            fail_after_rows: self.failures.fail_after_rows,
            connection_open: self.connection_open.clone(),
            table_open: self.open.clone(),
        }))
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.open.swap(false, Ordering::SeqCst) {
            self.stats.tables_closed.fetch_add(1, Ordering::SeqCst);
        }
        if self.failures.close_table {
            return Err(StoreError::io(format!("failed to close table {}", self.name)));
        }
        Ok(())
    }
}

struct MemoryScanner {
    table: String,
    store: MemoryStore,
    scan: ScanDescriptor,
    caching: usize,
    buffer: VecDeque<StoreRow>,
    cursor: Option<Vec<u8>>,
    exhausted: bool,
    closed: bool,
    delivered: usize,
    fail_after_rows: Option<usize>,
    connection_open: Arc<AtomicBool>,
    table_open: Arc<AtomicBool>,
}

#[async_trait]
impl ResultScanner for MemoryScanner {
    async fn next_row(&mut self) -> Result<Option<StoreRow>, StoreError> {
        if self.closed {
            return Ok(None);
        }
        if !self.connection_open.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionClosed);
        }
        if !self.table_open.load(Ordering::SeqCst) {
            return Err(StoreError::TableClosed(self.table.clone()));
        }
        if self
            .fail_after_rows
            .is_some_and(|limit| self.delivered >= limit)
        {
            return Err(StoreError::io("connection reset during scan"));
        }

        while self.buffer.is_empty() && !self.exhausted {
            let batch = self
                .store
                .fetch_batch(&self.table, self.cursor.as_deref(), self.caching, &self.scan)
                .await?;

            if batch.last_key.is_some() {
                self.cursor = batch.last_key;
            }
            self.exhausted = batch.exhausted;
            self.buffer.extend(batch.rows);
        }

        let row = self.buffer.pop_front();
        if row.is_some() {
            self.delivered += 1;
        }
        Ok(row)
    }

    fn close(&mut self) {
        self.closed = true;
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QUORUM_SETTING;
    use crate::scan::ScanOptions;

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            quorum: "localhost".to_string(),
            client_port: 2181,
            znode_parent: "/hbase".to_string(),
        }
    }

    async fn store_with_rows(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            store
                .put(
                    "docs",
                    StoreRow::new(format!("row-{i:03}")).with_cell("cf", "title", format!("t{i}")),
                )
                .await;
        }
        store
    }

    async fn drain(scanner: &mut Box<dyn ResultScanner>) -> Result<Vec<StoreRow>, StoreError> {
        let mut rows = Vec::new();
        while let Some(row) = scanner.next_row().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    #[tokio::test]
    async fn test_scan_pages_through_table() {
        let connector = MemoryConnector::new(store_with_rows(7).await);
        let connection = connector.connect(&config()).await.unwrap();
        let table = connection.table("docs").await.unwrap();

        let scan = ScanDescriptor::new(
            vec![],
            Default::default(),
            ScanOptions {
                caching: Some(3),
                timeout: None,
            },
        );
        let mut scanner = table.scan(&scan).await.unwrap();
        let rows = drain(&mut scanner).await.unwrap();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[6].key, b"row-006".to_vec());
        assert_eq!(connector.stats().scans_started(), 1);
    }

    #[tokio::test]
    async fn test_connect_records_settings() {
        let connector = MemoryConnector::new(MemoryStore::new());
        connector.connect(&config()).await.unwrap();

        let settings = connector.stats().last_settings().await.unwrap();
        assert_eq!(settings.get(QUORUM_SETTING).map(String::as_str), Some("localhost"));
        assert_eq!(connector.stats().connections_opened(), 1);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let connector = MemoryConnector::new(MemoryStore::new());
        let connection = connector.connect(&config()).await.unwrap();
        let err = connection.table("missing").await.err().unwrap();
        assert_eq!(err, StoreError::TableNotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_scan_fails_after_connection_closed() {
        let connector = MemoryConnector::new(store_with_rows(3).await);
        let connection = connector.connect(&config()).await.unwrap();
        let table = connection.table("docs").await.unwrap();
        let mut scanner = table.scan(&ScanDescriptor::full()).await.unwrap();

        assert!(scanner.next_row().await.unwrap().is_some());
        connection.close().await.unwrap();

        assert_eq!(scanner.next_row().await.unwrap_err(), StoreError::ConnectionClosed);
        assert_eq!(
            table.scan(&ScanDescriptor::full()).await.err().unwrap(),
            StoreError::ConnectionClosed
        );
    }

    #[tokio::test]
    async fn test_fail_after_rows() {
        let connector = MemoryConnector::new(store_with_rows(5).await).with_failures(FailurePlan {
            fail_after_rows: Some(2),
            ..Default::default()
        });
        let connection = connector.connect(&config()).await.unwrap();
        let table = connection.table("docs").await.unwrap();
        let mut scanner = table.scan(&ScanDescriptor::full()).await.unwrap();

        assert!(scanner.next_row().await.unwrap().is_some());
        assert!(scanner.next_row().await.unwrap().is_some());
        assert!(matches!(scanner.next_row().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_closed_scanner_yields_nothing() {
        let connector = MemoryConnector::new(store_with_rows(3).await);
        let connection = connector.connect(&config()).await.unwrap();
        let table = connection.table("docs").await.unwrap();
        let mut scanner = table.scan(&ScanDescriptor::full()).await.unwrap();

        scanner.close();
        assert!(scanner.next_row().await.unwrap().is_none());
    }
}
