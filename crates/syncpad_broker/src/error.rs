//! Error types for broker operations.

use syncpad_store::StoreError;
use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors that can occur in the document broker.
///
/// No error is fatal: a failed write leaves the broker serving the
/// last-good document indefinitely, and all retry decisions belong to the
/// caller.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The caller's expected version does not match the current version.
    ///
    /// Recoverable by the client: re-read the document and retry with the
    /// version it actually holds.
    #[error("version conflict: expected {expected}, current version is {current}")]
    VersionConflict {
        /// The version the caller expected to replace.
        expected: u64,
        /// The broker's current version.
        current: u64,
    },

    /// Durable persistence failed; the write was not acknowledged and the
    /// in-memory state still matches the last successful commit.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
