//! Lazy row stream over a store scan.

use std::time::Duration;

use futures::stream::{self, Stream};
use tracing::{debug, warn};

use crate::errors::ImportError;
use column_import_repository::{ResultScanner, StoreError};
use column_import_shared::RowRecord;

/// Forward-only, single-pass sequence of records from one scan.
///
/// Rows are fetched from the store only when the next record is requested.
/// After the scan completes or fails the stream is exhausted: a failed scan
/// is never resumed.
pub struct RowStream {
    scanner: Option<Box<dyn ResultScanner>>,
    table: String,
    timeout: Option<Duration>,
    rows_read: usize,
}

impl RowStream {
    pub(crate) fn new(
        scanner: Box<dyn ResultScanner>,
        table: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            scanner: Some(scanner),
            table: table.into(),
            timeout,
            rows_read: 0,
        }
    }

    /// Fetch the next record.
    ///
    /// # Returns
    ///
    /// * `Some(Ok(record))` - The next row
    /// * `Some(Err(ImportError::Scan))` - The scan failed; the stream is now exhausted
    /// * `None` - The stream is exhausted
    pub async fn next(&mut self) -> Option<Result<RowRecord, ImportError>> {
        let timeout = self.timeout;
        let scanner = self.scanner.as_mut()?;

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, scanner.next_row())
                .await
                .unwrap_or_else(|_| Err(StoreError::Timeout(limit.as_millis() as u64))),
            None => scanner.next_row().await,
        };

        match result {
            Ok(Some(row)) => {
                self.rows_read += 1;
                Some(Ok(row.into_record()))
            }
            Ok(None) => {
                debug!(table = %self.table, rows = self.rows_read, "Scan complete");
                self.finish();
                None
            }
            Err(e) => {
                warn!(
                    table = %self.table,
                    rows = self.rows_read,
                    error = %e,
                    "Scan failed while advancing"
                );
                self.finish();
                Some(Err(ImportError::scan(
                    format!("scan of {} failed after {} rows", self.table, self.rows_read),
                    e,
                )))
            }
        }
    }

    /// Whether no more records will be produced.
    pub fn is_exhausted(&self) -> bool {
        self.scanner.is_none()
    }

    /// Number of records produced so far.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// The scanned table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Adapt into a `futures::Stream`.
    pub fn into_stream(self) -> impl Stream<Item = Result<RowRecord, ImportError>> + Send {
        stream::unfold(self, |mut rows| async move {
            let item = rows.next().await?;
            Some((item, rows))
        })
    }

    fn finish(&mut self) {
        if let Some(mut scanner) = self.scanner.take() {
            scanner.close();
        }
    }
}

impl Drop for RowStream {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("table", &self.table)
            .field("rows_read", &self.rows_read)
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}
