//! Edge server - static assets plus `/api/*` pass-through
//!
//! One configurable server replacing the demo's pair of near-duplicate
//! frontend proxies. Requests under `/api/` are relayed byte-for-byte to
//! the gateway with hop-by-hop headers stripped; everything else is
//! served from a static directory with cache-busting headers. A bounded
//! client timeout turns an unreachable gateway into a 502 instead of a
//! hang. No retries: the browser is responsible for trying again.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, warn};

/// Edge server state
pub struct EdgeState {
    client: reqwest::Client,
    upstream: String,
}

impl EdgeState {
    /// Build the forwarding client with its bounded per-request timeout.
    pub fn new(upstream: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            upstream: upstream.trim_end_matches('/').to_string(),
        })
    }
}

/// Create the edge router. Cache-busting headers are applied to every
/// response, static and proxied alike.
pub fn create_router(state: Arc<EdgeState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/*path", any(forward))
        .fallback_service(ServeDir::new(static_dir))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .with_state(state)
}

/// Relay one `/api/*` request to the upstream gateway.
async fn forward(
    State(state): State<Arc<EdgeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let url = format!("{}{}", state.upstream, path_and_query);
    debug!(%method, %url, "Forwarding to upstream");

    let mut forward_headers = HeaderMap::new();
    for (name, value) in &headers {
        if is_hop_by_hop(name) {
            continue;
        }
        forward_headers.append(name.clone(), value.clone());
    }

    let mut request = state.client.request(method, &url).headers(forward_headers);
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream_response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => return bad_gateway(format!("upstream unreachable: {e}")),
    };

    let status = upstream_response.status();
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream_response.headers() {
        // The edge sets its own allow-origin; keeping the upstream's too
        // would hand the browser a duplicate header.
        if is_hop_by_hop(name) || name == header::ACCESS_CONTROL_ALLOW_ORIGIN {
            continue;
        }
        builder = builder.header(name.clone(), value.clone());
    }
    builder = builder.header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");

    let bytes = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return bad_gateway(format!("upstream unreachable: {e}")),
    };

    match builder.body(Body::from(bytes)) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Failed to relay upstream response");
            bad_gateway(format!("relaying upstream response: {e}"))
        }
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "transfer-encoding" | "connection" | "keep-alive" | "host" | "content-length"
    )
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}

fn bad_gateway(message: String) -> Response {
    warn!(%message, "Upstream forward failed");
    (
        StatusCode::BAD_GATEWAY,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(json!({ "error": message })),
    )
        .into_response()
}
