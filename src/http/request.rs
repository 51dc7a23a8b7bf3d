//! Request handling and transformation.
//!
//! # Responsibilities
//! - Pick the request ID used to correlate log lines
//! - Build the upstream URL from the inbound path and raw query
//! - Build the outbound request with every inbound header preserved
//!
//! # Design Decisions
//! - Path and query are copied byte-for-byte, no re-encoding
//! - Headers are appended one value at a time so repeated headers survive
//! - Framing headers (Host, Content-Length, Transfer-Encoding) are left to
//!   the client, the body may have been rewritten

use axum::body::{Body, Bytes};
use axum::http::{
    header::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING},
    request::Parts,
    HeaderMap, HeaderName, Request, Uri,
};
use uuid::Uuid;

/// Header carrying a caller supplied request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID for logging: the caller's `x-request-id`, or a fresh UUID v4.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// `<base><path>` plus `?<query>` when the inbound URI has a non-empty query.
pub fn upstream_url(base: &str, uri: &Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}{}?{}", base, uri.path(), query),
        _ => format!("{}{}", base, uri.path()),
    }
}

fn is_framing_header(name: &HeaderName) -> bool {
    *name == HOST || *name == CONTENT_LENGTH || *name == TRANSFER_ENCODING
}

/// Build the request sent upstream from the inbound request head and body.
pub fn build_upstream_request(
    parts: &Parts,
    url: &str,
    body: Bytes,
) -> Result<Request<Body>, axum::http::Error> {
    let mut builder = Request::builder().method(parts.method.clone()).uri(url);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            if is_framing_header(name) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
    }

    builder.body(Body::from(body))
}
