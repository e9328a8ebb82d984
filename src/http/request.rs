//! Request identification and tracing.
//!
//! # Responsibilities
//! - Name the request-id header shared by the id layers
//! - Build the per-request tracing span
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Client-supplied IDs are kept, so upstream proxies can correlate

use axum::{body::Body, http::Request};
use tracing::Span;

/// Header carrying the request ID, in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Span wrapping one request; the ID is set by `SetRequestIdLayer` before this runs.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}
