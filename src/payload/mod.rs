//! Request body preprocessing.
//!
//! # Data Flow
//! ```text
//! buffered request body
//!     → empty? forward as is
//!     → images.rs (parse JSON object, clean `images`, re-encode)
//!     → body forwarded upstream
//! ```
//!
//! # Design Decisions
//! - The body is a loosely typed `serde_json::Value` tree; any shape other
//!   than an `images` array passes through untouched
//! - A failed image check rejects the whole request, nothing is forwarded

pub mod images;

use axum::body::Bytes;
use thiserror::Error;

use crate::config::PayloadConfig;

pub use images::normalize_images;

/// Errors raised while preparing a request body for forwarding.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("request body is not a JSON object: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("image {index} is not valid base64: {source}")]
    InvalidImage {
        index: usize,
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to re-encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Apply every configured body transformation.
pub fn prepare_body(config: &PayloadConfig, body: Bytes) -> Result<Bytes, PayloadError> {
    if !config.normalize_images || body.is_empty() {
        return Ok(body);
    }
    normalize_images(body)
}
