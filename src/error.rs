//! Request-level failures and how they are reported to clients.
//!
//! Every variant is terminal for the request that raised it. Clients get a
//! short plain text body; the detailed cause only goes to the log.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::client::UpstreamError;
use crate::http::cors;
use crate::payload::PayloadError;

/// Why a proxied request could not be completed.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),
    #[error("failed to read request body: {0}")]
    ReadBody(#[source] axum::Error),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("failed to build upstream request: {0}")]
    BuildRequest(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    /// Status code sent to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::ReadBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Payload(PayloadError::InvalidJson(_)) => StatusCode::BAD_REQUEST,
            ProxyError::Payload(PayloadError::InvalidImage { .. }) => StatusCode::BAD_REQUEST,
            ProxyError::Payload(PayloadError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BuildRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Plain text body sent to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed(_) => "Method not allowed",
            ProxyError::ReadBody(_) => "Failed to read request body",
            ProxyError::Payload(PayloadError::InvalidJson(_)) => "Invalid JSON",
            ProxyError::Payload(PayloadError::InvalidImage { .. }) => "Invalid base64 in images",
            ProxyError::Payload(PayloadError::Encode(_)) => "Failed to process request",
            ProxyError::BuildRequest(_) => "Failed to create request",
            ProxyError::Upstream(_) => "Failed to proxy request",
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed(_) => "method_not_allowed",
            ProxyError::ReadBody(_) => "read_body",
            ProxyError::Payload(PayloadError::InvalidJson(_)) => "invalid_json",
            ProxyError::Payload(PayloadError::InvalidImage { .. }) => "invalid_image",
            ProxyError::Payload(PayloadError::Encode(_)) => "encode",
            ProxyError::BuildRequest(_) => "build_request",
            ProxyError::Upstream(UpstreamError::Timeout(_)) => "upstream_timeout",
            ProxyError::Upstream(UpstreamError::Transport(_)) => "upstream_transport",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), self.client_message()).into_response();
        cors::apply(response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use std::time::Duration;

    #[test]
    fn test_payload_errors_map_to_client_text() {
        let invalid = crate::payload::normalize_images(Bytes::from_static(b"{")).unwrap_err();
        let err = ProxyError::from(invalid);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Invalid JSON");

        let invalid = crate::payload::normalize_images(Bytes::from_static(br#"{"images":["@@"]}"#))
            .unwrap_err();
        let err = ProxyError::from(invalid);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Invalid base64 in images");
    }

    #[test]
    fn test_upstream_timeout_is_bad_gateway() {
        let err = ProxyError::from(UpstreamError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.client_message(), "Failed to proxy request");
        assert_eq!(err.kind(), "upstream_timeout");
    }

    #[test]
    fn test_error_response_carries_cors_headers() {
        let response = ProxyError::MethodNotAllowed(Method::GET).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
