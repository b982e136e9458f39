//! Value Codec Module
//!
//! Turns items into bytes and back. Two encodings share one byte space:
//!
//! - generic: `0xFF`, a format version byte, then the item as JSON
//! - scalar: the canonical UTF-8 text of a primitive value
//!
//! `0xFF` never starts valid UTF-8, so a reader can tell the two apart
//! from the bytes alone.

use crate::cache::{Integer, Item, Kind, Value};
use crate::cache::value::parse_text;
use crate::error::{CacheError, Result};

/// First byte of every generic encoding.
pub const GENERIC_MARKER: u8 = 0xFF;

/// Layout version of the generic encoding.
pub const FORMAT_VERSION: u8 = 0x01;

// == Generic Encoding ==
/// Encodes a full item (value, ttl and expiration).
pub fn encode(item: &Item) -> Result<Vec<u8>> {
    ensure_finite(&item.value)?;

    let mut buf = vec![GENERIC_MARKER, FORMAT_VERSION];
    serde_json::to_writer(&mut buf, item)?;
    Ok(buf)
}

/// Inverse of [`encode`]. Fails on anything that is not a complete
/// generic encoding of the current version.
pub fn decode(bytes: &[u8]) -> Result<Item> {
    match bytes {
        [GENERIC_MARKER, FORMAT_VERSION, body @ ..] => Ok(serde_json::from_slice(body)?),
        [GENERIC_MARKER, version, ..] => Err(CacheError::Codec(format!(
            "unsupported item format version {}",
            version
        ))),
        _ => Err(CacheError::Codec(
            "bytes are not a generic item encoding".to_string(),
        )),
    }
}

/// True if `bytes` carry the generic encoding marker.
pub fn is_generic(bytes: &[u8]) -> bool {
    bytes.first() == Some(&GENERIC_MARKER)
}

fn ensure_finite(value: &Value) -> Result<()> {
    let finite = match value {
        Value::F32(v) => v.is_finite(),
        Value::F64(v) => v.is_finite(),
        _ => true,
    };
    if finite {
        Ok(())
    } else {
        Err(CacheError::Codec(format!(
            "non-finite {} cannot be encoded",
            value.type_name()
        )))
    }
}

// == Scalar Encoding ==
pub fn is_scalar(value: &Value) -> bool {
    value.is_scalar()
}

/// Canonical text form of a scalar; `None` for structured values.
pub fn scalar_encode(value: &Value) -> Option<Vec<u8>> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Int(int) => int.to_string(),
        Value::Structured { .. } => return None,
    };
    Some(text.into_bytes())
}

/// Reads scalar text as a value of `kind`.
///
/// `Ok(None)` means `kind` is not a scalar kind, so the bytes should be
/// handed to the generic decoder instead.
pub fn scalar_decode(bytes: &[u8], kind: Kind) -> Result<Option<Value>> {
    if !kind.is_scalar() {
        return Ok(None);
    }

    let text = std::str::from_utf8(bytes)
        .map_err(|e| CacheError::Codec(format!("scalar text is not UTF-8: {}", e)))?;

    let value = match kind {
        Kind::String => Value::String(text.to_string()),
        Kind::Bool => Value::Bool(parse_text(text, kind.name())?),
        Kind::F32 => Value::F32(parse_text(text, kind.name())?),
        Kind::F64 => Value::F64(parse_text(text, kind.name())?),
        Kind::Int(int_kind) => Value::Int(Integer::parse(int_kind, text)?),
        Kind::Structured(_) => return Ok(None),
    };
    Ok(Some(value))
}
