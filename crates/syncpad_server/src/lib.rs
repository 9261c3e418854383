//! # syncpad Server
//!
//! HTTP boundary for the syncpad synchronization backend.
//!
//! This crate provides:
//! - The document endpoints (`GET /data` long-poll, `POST /data` write)
//! - The index page that bootstraps a browser client with the current
//!   document, version, and a CSRF token
//! - Embedded static assets (stylesheet, client script)
//! - CSRF token issuance backed by a key persisted in the data directory
//! - Process startup and graceful shutdown
//!
//! # Protocol
//!
//! Clients carry their known document version in the `X-Syncpad-Version`
//! header. A `GET /data` with the current version parks until the next
//! commit (long-poll); with an older version it returns immediately. A
//! `POST /data` must present the version it read; a mismatch is a 409 and
//! the client is expected to re-read and retry.
//!
//! The core never sees HTTP: this crate translates requests into
//! [`syncpad_broker::DocumentBroker`] calls and broker errors into status
//! codes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod csrf;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use csrf::CsrfProtect;
pub use error::{ApiError, ServeError};
pub use handler::{AppState, CSRF_HEADER, VERSION_HEADER};
pub use server::{build_router, serve};
