//! JSON side of the codec.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::CodecError;

/// Serialize `items` as a JSON array.
///
/// Serializer failures are logged and produce an empty body.
pub fn encode_json<T: Serialize>(items: &[T]) -> Vec<u8> {
    match serde_json::to_vec(items) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("JSON export failed: {}", e);
            Vec::new()
        }
    }
}

/// Parse a JSON array of `T`. `null` and blank input decode to no items.
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, CodecError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: Option<Vec<T>> = serde_json::from_str(text)?;
    Ok(parsed.unwrap_or_default())
}

/// True when `text` is bracketed by `{}` or `[]` and parses as JSON
pub fn is_valid_json(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    let bracketed = (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'));
    if !bracketed {
        return false;
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("Rejected JSON candidate: {}", e);
            false
        }
    }
}
