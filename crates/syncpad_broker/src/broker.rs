//! The versioned document broker.

use crate::document::Snapshot;
use crate::error::{BrokerError, BrokerResult};
use bytes::Bytes;
use parking_lot::RwLock;
use syncpad_store::DocumentStore;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Outcome of a [`DocumentBroker::read_wait`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A write advanced the document past the caller's version.
    Updated(Snapshot),
    /// The caller's cancellation signal fired before a newer version was
    /// committed. Not an error; no snapshot is returned.
    Cancelled,
}

/// State guarded by the broker's single exclusion domain.
struct Inner {
    payload: Bytes,
    version: u64,
    store: Box<dyn DocumentStore>,
}

/// The authoritative in-memory copy of the synchronized document.
///
/// One instance exists per process, created at startup from the durable
/// store and passed by reference (typically `Arc`) to every request
/// handler. All reads, writes, and waits go through it.
///
/// # Concurrency
///
/// Safe under arbitrary concurrent [`read`](Self::read),
/// [`read_wait`](Self::read_wait), and [`write`](Self::write) calls.
/// A blocked `read_wait` holds no lock while suspended; it re-acquires the
/// shared side only to re-check its predicate after a wake.
pub struct DocumentBroker {
    inner: RwLock<Inner>,
    /// Broadcasts the current version to parked waiters. Subscribing
    /// registers a waiter; dropping the receiver deregisters it.
    version_tx: watch::Sender<u64>,
}

impl DocumentBroker {
    /// Creates a broker seeded from the store's last committed state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. An empty store is not
    /// an error; the broker starts with an empty payload at version 0.
    pub fn open(store: Box<dyn DocumentStore>) -> BrokerResult<Self> {
        let doc = store.load()?;
        tracing::info!(
            version = doc.version,
            bytes = doc.payload.len(),
            "document broker initialized"
        );

        let (version_tx, _) = watch::channel(doc.version);
        Ok(Self {
            inner: RwLock::new(Inner {
                payload: Bytes::from(doc.payload),
                version: doc.version,
                store,
            }),
            version_tx,
        })
    }

    /// Returns the current stable snapshot.
    ///
    /// Never blocks beyond the brief shared-lock window needed to copy it.
    #[must_use]
    pub fn read(&self) -> Snapshot {
        let inner = self.inner.read();
        Snapshot {
            payload: inner.payload.clone(),
            version: inner.version,
        }
    }

    /// Returns the current version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Returns the number of currently parked waiters.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.version_tx.receiver_count()
    }

    /// Waits until the document is newer than `client_version`.
    ///
    /// If the caller is already behind (`client_version` < current), the
    /// current snapshot is returned immediately. Otherwise the call parks
    /// until a write commits a version strictly greater than
    /// `client_version`, or until `cancel` fires, whichever happens first.
    ///
    /// Using `>=` for the park condition makes the call robust to a client
    /// that race-reports a version equal to or ahead of the server's: it
    /// always waits for strictly newer data instead of echoing the same
    /// payload back.
    ///
    /// Every pending waiter is woken by every commit and re-checks its own
    /// predicate, so a waiter may be woken spuriously by a commit that is
    /// not yet newer than its `client_version`; it simply parks again.
    pub async fn read_wait(&self, client_version: u64, cancel: CancellationToken) -> WaitOutcome {
        // Register before the first predicate check: a commit landing
        // between the check and the await below is then already pending on
        // the receiver and the wakeup cannot be missed.
        let mut version_rx = self.version_tx.subscribe();

        loop {
            {
                let inner = self.inner.read();
                if inner.version > client_version {
                    return WaitOutcome::Updated(Snapshot {
                        payload: inner.payload.clone(),
                        version: inner.version,
                    });
                }
            }

            tokio::select! {
                changed = version_rx.changed() => {
                    if changed.is_err() {
                        // The sender lives on `self`, so this is only
                        // reachable during teardown.
                        return WaitOutcome::Cancelled;
                    }
                }
                () = cancel.cancelled() => return WaitOutcome::Cancelled,
            }
        }
    }

    /// Applies a new payload under optimistic concurrency control.
    ///
    /// The caller must present the version it read; a mismatch fails with
    /// [`BrokerError::VersionConflict`] and has no side effects - the store
    /// is not touched. On match, the new pair is committed durably
    /// *before* the in-memory swap, so a store failure leaves the
    /// observable state exactly as it was and the write is never
    /// acknowledged without being durable.
    ///
    /// On success every parked waiter is woken (broadcast, not a single
    /// hand-off) and the new version is returned.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::VersionConflict`] if `expected_version` is not the
    ///   current version.
    /// - [`BrokerError::Store`] if the durable commit fails.
    pub fn write(&self, expected_version: u64, payload: Bytes) -> BrokerResult<u64> {
        let mut inner = self.inner.write();

        if expected_version != inner.version {
            return Err(BrokerError::VersionConflict {
                expected: expected_version,
                current: inner.version,
            });
        }

        let next = inner.version + 1;
        inner.store.commit(&payload, next)?;

        inner.payload = payload;
        inner.version = next;
        tracing::debug!(version = next, bytes = inner.payload.len(), "document committed");

        // Still inside the exclusive section: waiters woken here observe
        // the new state as soon as they can take the shared lock.
        self.version_tx.send_replace(next);

        Ok(next)
    }
}
