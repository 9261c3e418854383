//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred while reading or committing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another process holds the lock on the data directory.
    #[error("data directory is locked by another process")]
    Locked,
}
