//! # syncpad Broker
//!
//! The authoritative in-memory copy of the synchronized document.
//!
//! This crate provides:
//! - A single exclusion domain over the `(payload, version)` pair
//! - Optimistic-concurrency writes that are durable before they are
//!   acknowledged
//! - A wait-for-next-version protocol that lets many readers block on
//!   "has this changed since version V" without polling
//!
//! # Architecture
//!
//! The broker serializes all mutations through one `RwLock`. Reads and the
//! version comparison in [`DocumentBroker::read_wait`] take the shared
//! side; a write holds the exclusive side for the in-memory swap plus the
//! durable commit, so version numbers form a total order matching commit
//! order.
//!
//! Change notification rides a `tokio::sync::watch` channel carrying the
//! current version. Every blocked waiter holds a private receiver; a commit
//! broadcasts to all of them, and each re-checks its own version predicate
//! before returning - the standard wait/notify-with-recheck pattern, so
//! spurious wakes are harmless.
//!
//! # Example
//!
//! ```
//! use syncpad_broker::DocumentBroker;
//! use syncpad_store::MemoryStore;
//!
//! let broker = DocumentBroker::open(Box::new(MemoryStore::new())).unwrap();
//! let version = broker.write(0, "{}".into()).unwrap();
//! assert_eq!(version, 1);
//! assert_eq!(broker.read().version, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod broker;
mod document;
mod error;

pub use broker::{DocumentBroker, WaitOutcome};
pub use document::Snapshot;
pub use error::{BrokerError, BrokerResult};
