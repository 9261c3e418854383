//! Router assembly and the serve loop.

use crate::config::ServerConfig;
use crate::csrf::CsrfProtect;
use crate::error::ServeError;
use crate::handler::{self, AppState};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use syncpad_broker::DocumentBroker;
use syncpad_store::FileStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Builds the application router over the given state.
///
/// Unmatched methods on matched paths get a 405 from the method routers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/data", get(handler::data_get).post(handler::data_post))
        .route("/style.css", get(handler::stylesheet))
        .route("/app.js", get(handler::client_js))
        .with_state(state)
}

/// Opens the durable store, seeds the broker, and serves until shutdown.
///
/// On ctrl-c the long-poll cancellation token fires first so parked
/// waiters drain with a 204, then the listener stops accepting and
/// in-flight requests complete.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened (including when
/// another process holds its lock), the broker cannot be seeded, or the
/// listener cannot be bound.
pub async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    let store = FileStore::open(&config.data_dir)?;
    let broker = Arc::new(DocumentBroker::open(Box::new(store))?);
    let csrf = Arc::new(CsrfProtect::load_or_generate(&config.data_dir)?);

    let shutdown = CancellationToken::new();
    let state = AppState {
        broker,
        csrf,
        shutdown: shutdown.clone(),
    };

    let app = build_router(state);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, data_dir = %config.data_dir.display(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("shutting down, releasing parked long-polls");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
        // Without a signal handler there is no clean way down; park this
        // future so the server keeps running.
        std::future::pending::<()>().await;
    }
}
