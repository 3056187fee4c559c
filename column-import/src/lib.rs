//! # Column Import
//!
//! Entry point and configuration for running a column store import: rows
//! are scanned from a table and written out as flat JSON records, one per
//! line, ready for indexing.

pub mod config;

pub use config::{Dependencies, ImportConfig};

use std::io::Write;

use thiserror::Error;
use tracing::{info, instrument, warn};

use column_import_pipeline::ImportError;
use column_import_shared::ConfigurationError;

/// Errors that can occur during importer initialization or execution.
#[derive(Error, Debug)]
pub enum ImporterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid entity or snapshot configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    /// Import pipeline error.
    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ImporterError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Run one import, writing each record as a JSON line to `out`.
///
/// The data source is always closed, even when the import fails part way.
///
/// # Returns
///
/// * `Ok(usize)` - Number of records written
/// * `Err(ImporterError)` - The first failure encountered
#[instrument(skip_all)]
pub async fn run_import<W: Write>(
    mut deps: Dependencies,
    out: &mut W,
) -> Result<usize, ImporterError> {
    let result = drain_rows(&mut deps, out).await;
    let closed = deps.processor.destroy().await;

    match (result, closed) {
        (Ok(count), Ok(())) => {
            info!(records = count, "Import complete");
            Ok(count)
        }
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "Failed to close data source after import failure");
            }
            Err(e)
        }
    }
}

async fn drain_rows<W: Write>(deps: &mut Dependencies, out: &mut W) -> Result<usize, ImporterError> {
    deps.processor
        .init(deps.context.clone(), &deps.properties)
        .await?;

    let mut count = 0;
    while let Some(record) = deps.processor.next_row().await? {
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;

    Ok(count)
}
