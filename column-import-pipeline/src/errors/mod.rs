//! Error types for the import pipeline.

use column_import_repository::StoreError;
use column_import_shared::ConfigurationError;
use thiserror::Error;

use crate::source::SourceStatus;

/// Errors that can occur while importing rows.
///
/// Nothing is retried by the pipeline; every failure is returned to the
/// caller as soon as it happens.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The connection or table handle could not be opened. `suppressed`
    /// carries a failure to release the connection afterwards.
    #[error(
        "Connection error: {message}{}",
        .suppressed.as_ref().map(|s| format!(" (suppressed: {s})")).unwrap_or_default()
    )]
    Connection {
        message: String,
        #[source]
        source: StoreError,
        suppressed: Option<StoreError>,
    },

    /// A scan could not be started or failed while advancing.
    #[error("Scan error: {message}")]
    Scan {
        message: String,
        #[source]
        source: StoreError,
    },

    /// The operation is not valid in the data source's current state.
    #[error("Cannot {operation} while the data source is {state}")]
    InvalidState {
        operation: &'static str,
        state: SourceStatus,
    },

    /// Releasing the table handle or connection failed. When both failed,
    /// the connection failure is primary and the table failure is suppressed.
    #[error(
        "Close error: {primary}{}",
        .suppressed.as_ref().map(|s| format!(" (suppressed: {s})")).unwrap_or_default()
    )]
    Close {
        #[source]
        primary: StoreError,
        suppressed: Option<StoreError>,
    },
}

impl ImportError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>, source: StoreError) -> Self {
        Self::Connection {
            message: message.into(),
            source,
            suppressed: None,
        }
    }

    /// Attach a release failure that happened while handling this error.
    pub fn with_suppressed(mut self, error: StoreError) -> Self {
        match &mut self {
            Self::Connection { suppressed, .. } | Self::Close { suppressed, .. } => {
                *suppressed = Some(error);
            }
            _ => {}
        }
        self
    }

    /// Create a scan error.
    pub fn scan(message: impl Into<String>, source: StoreError) -> Self {
        Self::Scan {
            message: message.into(),
            source,
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(operation: &'static str, state: SourceStatus) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Create a close error.
    pub fn close(primary: StoreError, suppressed: Option<StoreError>) -> Self {
        Self::Close {
            primary,
            suppressed,
        }
    }
}
