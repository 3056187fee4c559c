//! Store client trait definitions.
//!
//! A connector opens connections, a connection opens table handles, and a
//! table handle starts scans. Handles are released explicitly with `close`;
//! the caller owns them exclusively.

use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::errors::StoreError;
use crate::scan::ScanDescriptor;
use crate::types::StoreRow;

/// Opens connections to a store.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a connection using the given settings.
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn StoreConnection>)` - An open connection owned by the caller
    /// * `Err(StoreError)` - If the store cannot be reached
    async fn connect(&self, config: &ConnectionConfig)
        -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// An open connection to the store.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// Open a handle to the named table.
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn StoreTable>)` - An open table handle owned by the caller
    /// * `Err(StoreError::TableNotFound)` - If the table does not exist
    /// * `Err(StoreError)` - If the handle cannot be opened
    async fn table(&self, name: &str) -> Result<Box<dyn StoreTable>, StoreError>;

    /// Release the connection. Table handles opened from it become unusable.
    async fn close(&self) -> Result<(), StoreError>;
}

/// An open handle to one table.
#[async_trait]
pub trait StoreTable: Send + Sync {
    /// The table name.
    fn name(&self) -> &str;

    /// Start a scan.
    ///
    /// Failures to start the scan are reported here. The returned scanner is
    /// independent of any other scanner started from the same handle.
    async fn scan(&self, scan: &ScanDescriptor) -> Result<Box<dyn ResultScanner>, StoreError>;

    /// Release the table handle.
    async fn close(&self) -> Result<(), StoreError>;
}

/// Forward-only cursor over the rows of one scan.
#[async_trait]
pub trait ResultScanner: Send {
    /// Fetch the next row, waiting on the store if the current batch is used up.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(row))` - The next row
    /// * `Ok(None)` - The scan is complete
    /// * `Err(StoreError)` - The scan failed and cannot continue
    async fn next_row(&mut self) -> Result<Option<StoreRow>, StoreError>;

    /// Abandon the scan and release its server-side resources.
    fn close(&mut self);
}
