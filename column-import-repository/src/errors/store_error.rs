//! Store error types.
//!
//! This module defines the errors a store client can report while
//! connecting, opening tables, scanning, or releasing handles.

use thiserror::Error;

/// Errors reported by a store client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network or transport failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// The requested table does not exist.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The connection was used after it was closed.
    #[error("Connection is closed")]
    ConnectionClosed,

    /// The table handle was used after it was closed.
    #[error("Table is closed: {0}")]
    TableClosed(String),

    /// The server rejected or failed the request.
    #[error("Server error: {0}")]
    Server(String),

    /// An operation did not complete in time.
    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

impl StoreError {
    /// Create an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}
