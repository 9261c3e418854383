//! In-memory document store for testing.

use crate::error::{StoreError, StoreResult};
use crate::store::{DocumentStore, PersistedDocument};
use parking_lot::RwLock;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// An in-memory document store.
///
/// This store keeps the committed pair in memory and is suitable for unit
/// tests that must not touch the filesystem. It additionally counts commits
/// and can be told to reject them, so callers can verify both "the store
/// was never touched" and "a failed commit is surfaced without
/// acknowledging the write".
///
/// Clones share state: hand one clone to the component under test and keep
/// another to observe what was committed.
///
/// # Example
///
/// ```
/// use syncpad_store::{DocumentStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// let probe = store.clone();
///
/// store.commit(b"hello", 1).unwrap();
/// assert_eq!(probe.commit_count(), 1);
/// assert_eq!(probe.load().unwrap().version, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    committed: RwLock<PersistedDocument>,
    commits: AtomicU64,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-existing committed state.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_document(payload: Vec<u8>, version: u64) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                committed: RwLock::new(PersistedDocument { payload, version }),
                commits: AtomicU64::new(0),
                fail_commits: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the number of successful commits.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.load(Ordering::SeqCst)
    }

    /// Makes subsequent commits fail with a permission-denied I/O error,
    /// simulating a medium that rejects writes.
    pub fn set_fail_commits(&self, fail: bool) {
        self.inner.fail_commits.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> StoreResult<PersistedDocument> {
        Ok(self.inner.committed.read().clone())
    }

    fn commit(&mut self, payload: &[u8], version: u64) -> StoreResult<()> {
        if self.inner.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "commit rejected by test configuration",
            )));
        }

        *self.inner.committed.write() = PersistedDocument {
            payload: payload.to_vec(),
            version,
        };
        self.inner.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = MemoryStore::new();
        let doc = store.load().unwrap();
        assert!(doc.payload.is_empty());
        assert_eq!(doc.version, 0);
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn commit_replaces_the_pair() {
        let mut store = MemoryStore::new();

        store.commit(b"one", 1).unwrap();
        store.commit(b"two", 2).unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.payload, b"two");
        assert_eq!(doc.version, 2);
        assert_eq!(store.commit_count(), 2);
    }

    #[test]
    fn with_document_preloads_state() {
        let store = MemoryStore::with_document(b"seed".to_vec(), 7);
        let doc = store.load().unwrap();
        assert_eq!(doc.payload, b"seed");
        assert_eq!(doc.version, 7);
    }

    #[test]
    fn clones_share_state() {
        let mut store = MemoryStore::new();
        let probe = store.clone();

        store.commit(b"shared", 1).unwrap();

        assert_eq!(probe.commit_count(), 1);
        assert_eq!(probe.load().unwrap().payload, b"shared");
    }

    #[test]
    fn failed_commit_preserves_previous_state() {
        let mut store = MemoryStore::new();
        store.commit(b"durable", 1).unwrap();

        store.set_fail_commits(true);
        let result = store.commit(b"lost", 2);
        assert!(matches!(result, Err(StoreError::Io(_))));

        let doc = store.load().unwrap();
        assert_eq!(doc.payload, b"durable");
        assert_eq!(doc.version, 1);
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn fail_flag_can_be_cleared() {
        let mut store = MemoryStore::new();

        store.set_fail_commits(true);
        assert!(store.commit(b"x", 1).is_err());

        store.set_fail_commits(false);
        assert!(store.commit(b"x", 1).is_ok());
    }
}
