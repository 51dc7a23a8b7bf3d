//! Base64 image cleanup for generate/chat request bodies.
//!
//! Browser clients often submit images produced by `FileReader` or copied out
//! of PEM-style tools, which wrap the base64 text with line breaks. The
//! upstream rejects those, so whitespace is stripped here and the result is
//! checked before anything is forwarded.

use axum::body::Bytes;
use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde_json::{Map, Value};

use crate::payload::PayloadError;

/// Key holding the image array in a request body.
pub const IMAGES_KEY: &str = "images";

/// Standard alphabet with required padding. Non-zero trailing bits in the
/// last symbol are tolerated.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Normalize the `images` array of a JSON object body.
///
/// Returns the original bytes when there is no `images` array, so bodies that
/// need no rewrite are forwarded byte-for-byte.
pub fn normalize_images(body: Bytes) -> Result<Bytes, PayloadError> {
    let mut object: Map<String, Value> =
        serde_json::from_slice(&body).map_err(PayloadError::InvalidJson)?;

    let Some(Value::Array(images)) = object.get_mut(IMAGES_KEY) else {
        return Ok(body);
    };

    for (index, image) in images.iter_mut().enumerate() {
        if let Value::String(encoded) = image {
            let cleaned = strip_whitespace(encoded);
            LENIENT_STANDARD
                .decode(&cleaned)
                .map_err(|source| PayloadError::InvalidImage { index, source })?;
            *encoded = cleaned;
        }
    }

    serde_json::to_vec(&object)
        .map(Bytes::from)
        .map_err(PayloadError::Encode)
}

/// Remove line feeds, carriage returns and spaces anywhere in the string.
pub fn strip_whitespace(encoded: &str) -> String {
    encoded
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | ' '))
        .collect()
}
