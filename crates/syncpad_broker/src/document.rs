//! The versioned document snapshot.

use bytes::Bytes;

/// An immutable view of the document at a committed version.
///
/// The pair is always read and written together: a `Snapshot` never
/// combines a payload and a version from different commits. Cloning is
/// cheap (`Bytes` is reference-counted), which keeps broadcast fan-out to
/// many waiters O(1) per waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The opaque document payload.
    pub payload: Bytes,
    /// Monotonically increasing version, starting at 0 for an empty store.
    pub version: u64,
}
