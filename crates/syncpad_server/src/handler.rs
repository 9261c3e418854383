//! Request handlers for the document endpoints.

use crate::csrf::CsrfProtect;
use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use syncpad_broker::{DocumentBroker, Snapshot, WaitOutcome};
use tokio_util::sync::CancellationToken;

/// Header carrying the client's known document version (request) and the
/// server's current version (response).
pub const VERSION_HEADER: &str = "x-syncpad-version";

/// Header carrying the CSRF token on mutating requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

const INDEX_TEMPLATE: &str = include_str!("../static/index.html");
const STYLESHEET: &str = include_str!("../static/style.css");
const CLIENT_JS: &str = include_str!("../static/app.js");

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The authoritative document broker.
    pub broker: Arc<DocumentBroker>,
    /// CSRF token issuer/verifier.
    pub csrf: Arc<CsrfProtect>,
    /// Cancelled on shutdown so parked long-polls drain cleanly.
    pub shutdown: CancellationToken,
}

/// `GET /` - the index page, bootstrapped with the current document.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.broker.read();
    Html(render_index(&snapshot, &state.csrf.issue()))
}

/// `GET /data` - read the document.
///
/// Without a [`VERSION_HEADER`] this returns the current snapshot
/// immediately. With one, a caller that is behind also gets the snapshot
/// immediately, while a caller that is current parks until the next commit
/// (long-poll). Server shutdown cancels the wait with an empty 204. A
/// disconnected caller simply drops the handler future, which deregisters
/// its waiter.
pub async fn data_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(client_version) = parse_version_header(&headers)? else {
        return Ok(snapshot_response(state.broker.read()));
    };

    let cancel = state.shutdown.child_token();
    match state.broker.read_wait(client_version, cancel).await {
        WaitOutcome::Updated(snapshot) => Ok(snapshot_response(snapshot)),
        WaitOutcome::Cancelled => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `POST /data` - replace the document under optimistic concurrency.
///
/// Requires a valid CSRF token and the version the caller read. On success
/// the new version is returned in [`VERSION_HEADER`] with an empty body.
pub async fn data_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let token = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.csrf.verify(token) {
        return Err(ApiError::CsrfRejected);
    }

    let expected_version = parse_version_header(&headers)?
        .ok_or_else(|| ApiError::InvalidVersion("header missing".into()))?;
    let new_version = state.broker.write(expected_version, body)?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(version_header_name(), HeaderValue::from(new_version));
    Ok((StatusCode::OK, response_headers).into_response())
}

/// `GET /style.css`
pub async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css")], STYLESHEET)
}

/// `GET /app.js`
pub async fn client_js() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript")], CLIENT_JS)
}

fn version_header_name() -> HeaderName {
    HeaderName::from_static(VERSION_HEADER)
}

fn parse_version_header(headers: &HeaderMap) -> Result<Option<u64>, ApiError> {
    let Some(raw) = headers.get(VERSION_HEADER) else {
        return Ok(None);
    };
    let text = raw
        .to_str()
        .map_err(|_| ApiError::InvalidVersion("header is not valid ASCII".into()))?;
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| ApiError::InvalidVersion(format!("{text:?}")))
}

fn snapshot_response(snapshot: Snapshot) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    // Long-poll responses must never be served from an intermediary cache.
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(version_header_name(), HeaderValue::from(snapshot.version));
    (StatusCode::OK, headers, snapshot.payload).into_response()
}

fn render_index(snapshot: &Snapshot, csrf_token: &str) -> String {
    let data = if snapshot.payload.is_empty() {
        "null".to_string()
    } else {
        escape_json_for_html(&String::from_utf8_lossy(&snapshot.payload))
    };

    INDEX_TEMPLATE
        .replace("{{version}}", &snapshot.version.to_string())
        .replace("{{csrf_token}}", csrf_token)
        .replace("{{data}}", &data)
}

/// Escapes a JSON document for embedding in a `<script>` block.
///
/// In well-formed JSON a `<` can only occur inside a string literal, where
/// the `\u003c` escape is equivalent, so a blanket replacement cannot
/// change the document's meaning but does neutralize `</script>`.
fn escape_json_for_html(json: &str) -> String {
    json.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_version(version: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(version_header_name(), HeaderValue::from_str(version).unwrap());
        headers
    }

    #[test]
    fn version_header_parses() {
        assert_eq!(
            parse_version_header(&headers_with_version("0")).unwrap(),
            Some(0)
        );
        assert_eq!(
            parse_version_header(&headers_with_version("42")).unwrap(),
            Some(42)
        );
    }

    #[test]
    fn missing_version_header_is_a_plain_read() {
        assert_eq!(parse_version_header(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn non_numeric_version_rejected() {
        for bad in ["", "abc", "-1", "1.5"] {
            let result = parse_version_header(&headers_with_version(bad));
            assert!(matches!(result, Err(ApiError::InvalidVersion(_))), "{bad:?}");
        }
    }

    #[test]
    fn script_close_tag_neutralized() {
        let escaped = escape_json_for_html(r#"{"note":"</script><img>"}"#);
        assert!(!escaped.contains("</script>"));
        assert!(escaped.contains("\\u003c/script>"));
    }

    #[test]
    fn index_substitutes_placeholders() {
        let snapshot = Snapshot {
            payload: r#"{"a":1}"#.into(),
            version: 9,
        };
        let page = render_index(&snapshot, "token123");

        assert!(page.contains(r#"{"a":1}"#));
        assert!(page.contains("token123"));
        assert!(page.contains('9'));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn empty_document_renders_null() {
        let snapshot = Snapshot {
            payload: Bytes::new(),
            version: 0,
        };
        let page = render_index(&snapshot, "t");
        assert!(page.contains("null"));
    }
}
