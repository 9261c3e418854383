//! # syncpad Store
//!
//! Durable storage for the syncpad document.
//!
//! This crate owns the on-disk representation of the single synchronized
//! document and its version counter. It knows nothing about versions being
//! compared or clients waiting - it only guarantees that whatever was last
//! committed can be read back after a crash or restart.
//!
//! ## Design Principles
//!
//! - The document is an **opaque byte payload**; no format interpretation
//!   happens here.
//! - Commits are atomic with respect to process crash: a reader after a
//!   crash sees either the previous complete document or the new complete
//!   document, never a torn one.
//! - The version marker is a plain decimal text file replaced with the same
//!   stage-then-rename discipline as the payload.
//!
//! ## Available Stores
//!
//! - [`FileStore`] - Persistent storage over a data directory
//! - [`MemoryStore`] - For tests; supports commit counting and fault
//!   injection
//!
//! ## Example
//!
//! ```no_run
//! use syncpad_store::{DocumentStore, FileStore};
//! use std::path::Path;
//!
//! let mut store = FileStore::open(Path::new("syncpad-data")).unwrap();
//! let doc = store.load().unwrap();
//! store.commit(b"{\"notes\":[]}", doc.version + 1).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{DocumentStore, PersistedDocument};
