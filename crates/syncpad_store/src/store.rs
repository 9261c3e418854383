//! Document store trait definition.

use crate::error::StoreResult;

/// The document state recovered from durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedDocument {
    /// The document payload. Empty if nothing has ever been committed.
    pub payload: Vec<u8>,
    /// The last persisted version, or 0 if none is recorded.
    pub version: u64,
}

impl PersistedDocument {
    /// The state of a store that has never seen a commit.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            payload: Vec::new(),
            version: 0,
        }
    }
}

/// Durable storage for a single versioned document.
///
/// Stores are **opaque byte stores**: the payload is never interpreted.
/// The version is carried alongside the payload purely so it can be
/// recovered on restart.
///
/// # Invariants
///
/// - `load` after a successful `commit` returns exactly the committed pair,
///   including across process restart.
/// - `load` on a store that has never committed returns an empty payload
///   and version 0; this is a normal first run, not an error.
/// - A `commit` that returns an error has not replaced the previously
///   readable document.
///
/// # Implementors
///
/// - [`super::FileStore`] - For persistent storage
/// - [`super::MemoryStore`] - For testing
pub trait DocumentStore: Send + Sync {
    /// Loads the document from the last successful commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be read.
    fn load(&self) -> StoreResult<PersistedDocument>;

    /// Durably replaces the stored document.
    ///
    /// Must be atomic with respect to process crash: after a crash during
    /// commit, the next `load` sees either the old or the new document in
    /// full, never a partial one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium rejects the write. The
    /// caller must treat this as "in-memory state has diverged from disk"
    /// and must not acknowledge the write.
    fn commit(&mut self, payload: &[u8], version: u64) -> StoreResult<()>;
}
