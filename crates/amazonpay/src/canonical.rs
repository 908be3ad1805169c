//! # Canonical JSON
//!
//! Deterministic serialization of request bodies. The bytes produced here
//! are both hashed into the signature and sent as the request body, so
//! they must not depend on struct field order or map iteration order.
//!
//! Object keys are emitted in ascending byte order at every nesting level,
//! with no insignificant whitespace. Scalars use `serde_json`'s encoding.
//! `Option::None` fields are absent as long as the type marks them
//! `skip_serializing_if = "Option::is_none"`, which every request type in
//! this crate does.

use amazonpay_core::{AmazonPayError, ApiResult};
use serde::Serialize;
use serde_json::Value;

/// Canonical bytes for an optional body. `None` yields an empty payload.
pub fn canonicalize<T: Serialize + ?Sized>(body: Option<&T>) -> ApiResult<Vec<u8>> {
    match body {
        Some(body) => to_canonical_vec(body),
        None => Ok(Vec::new()),
    }
}

/// Canonical bytes for a body value
pub fn to_canonical_vec<T: Serialize + ?Sized>(body: &T) -> ApiResult<Vec<u8>> {
    let value = serde_json::to_value(body).map_err(encoding_error)?;
    let mut out = Vec::with_capacity(128);
    write_value(&mut out, &value)?;
    Ok(out)
}

/// Canonical JSON as a string (used for button payloads embedded in HTML)
pub fn to_canonical_string<T: Serialize + ?Sized>(body: &T) -> ApiResult<String> {
    let bytes = to_canonical_vec(body)?;
    // serde_json only ever writes UTF-8
    String::from_utf8(bytes).map_err(|e| AmazonPayError::Encoding(e.to_string()))
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> ApiResult<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push(b'{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key).map_err(encoding_error)?;
                out.push(b':');
                write_value(out, value)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item)?;
            }
            out.push(b']');
        }
        scalar => serde_json::to_writer(&mut *out, scalar).map_err(encoding_error)?,
    }
    Ok(())
}

fn encoding_error(e: serde_json::Error) -> AmazonPayError {
    AmazonPayError::Encoding(e.to_string())
}
