//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream status, headers and body to the client
//! - Add the CORS headers browsers need
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - CORS headers go first, upstream headers are appended after them without
//!   de-duplication, so an upstream CORS header shows up twice
//! - Dropping the client side of the stream drops the upstream body too

use axum::body::Body;
use axum::http::Response;
use axum::response::Response as ClientResponse;
use hyper::body::Incoming;

use crate::http::cors;

/// Turn an upstream response into the response sent to the client.
pub fn relay(upstream: Response<Incoming>) -> ClientResponse {
    let (parts, body) = upstream.into_parts();

    let mut response = ClientResponse::new(Body::new(body));
    *response.status_mut() = parts.status;

    let headers = response.headers_mut();
    cors::apply(headers);
    for (name, value) in parts.headers.iter() {
        headers.append(name.clone(), value.clone());
    }

    response
}
