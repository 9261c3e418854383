//! Error types for the HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use syncpad_broker::BrokerError;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The version header was missing or not a decimal integer.
    #[error("invalid version header: {0}")]
    InvalidVersion(String),

    /// Optimistic-concurrency conflict: the client must re-read and retry.
    #[error("version conflict: expected {expected}, current version is {current}")]
    Conflict {
        /// The version the client presented.
        expected: u64,
        /// The version the server currently holds.
        current: u64,
    },

    /// Durable persistence failed; the write was not applied.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The request lacked a valid CSRF token.
    #[error("missing or invalid CSRF token")]
    CsrfRejected,
}

impl ApiError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidVersion(_) | ApiError::Conflict { .. } | ApiError::CsrfRejected
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidVersion(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CsrfRejected => StatusCode::FORBIDDEN,
        }
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::VersionConflict { expected, current } => {
                ApiError::Conflict { expected, current }
            }
            BrokerError::Store(store_err) => ApiError::Storage(store_err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if self.is_client_error() {
            tracing::debug!(%status, error = %message, "request rejected");
        } else {
            tracing::error!(%status, error = %message, "request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Errors that can stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The durable store could not be opened.
    #[error("store error: {0}")]
    Store(#[from] syncpad_store::StoreError),

    /// The broker could not be seeded from the store.
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    /// Binding or serving the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_errors_map_to_api_errors() {
        let conflict: ApiError = BrokerError::VersionConflict {
            expected: 3,
            current: 5,
        }
        .into();
        assert!(matches!(
            conflict,
            ApiError::Conflict {
                expected: 3,
                current: 5
            }
        ));
        assert!(conflict.is_client_error());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::InvalidVersion("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict {
                expected: 1,
                current: 2
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Storage("disk full".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::CsrfRejected.status(), StatusCode::FORBIDDEN);
    }
}
