//! Route state codec
//!
//! Navigation state travels through history entries as percent-encoded JSON.
//! Encoding and decoding fail open: a broken state bag degrades to an empty
//! string or an empty map and is logged, it never blocks a navigation.
//!
//! Values JSON cannot carry are not round-tripped. In Rust that means any
//! `Serialize` impl that skips fields or refuses to serialize.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Keys removed by [`sanitize`] when no deny-list is configured
pub const DEFAULT_DENY_LIST: &[&str] = &["password", "token", "secret", "apiKey"];

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization or parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Percent-decoding produced invalid UTF-8
    #[error("Invalid percent-encoding: {0}")]
    PercentDecoding(#[from] std::string::FromUtf8Error),

    /// Decoded JSON was not an object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Serialize and percent-encode, reporting failures
pub fn try_encode<T: Serialize + ?Sized>(state: &T) -> Result<String> {
    let json = serde_json::to_string(state)?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Serialize and percent-encode; returns an empty string on failure
pub fn encode<T: Serialize + ?Sized>(state: &T) -> String {
    match try_encode(state) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode route state");
            String::new()
        }
    }
}

/// Percent-decode and parse a JSON object, reporting failures
pub fn try_decode(encoded: &str) -> Result<Map<String, Value>> {
    if encoded.is_empty() {
        return Ok(Map::new());
    }

    let json = urlencoding::decode(encoded)?;
    match serde_json::from_str::<Value>(&json)? {
        Value::Object(map) => Ok(map),
        other => Err(CodecError::NotAnObject(json_type_name(&other))),
    }
}

/// Percent-decode and parse a JSON object; returns an empty map on failure
pub fn decode(encoded: &str) -> Map<String, Value> {
    match try_decode(encoded) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode route state");
            Map::new()
        }
    }
}

/// Copy `state` without any key in `deny_list`, at any depth
///
/// Objects nested in arrays are sanitized too; scalars pass through.
pub fn sanitize<S: AsRef<str>>(state: &Map<String, Value>, deny_list: &[S]) -> Map<String, Value> {
    state
        .iter()
        .filter(|(key, _)| !is_denied(key, deny_list))
        .map(|(key, value)| (key.clone(), sanitize_value(value, deny_list)))
        .collect()
}

fn sanitize_value<S: AsRef<str>>(value: &Value, deny_list: &[S]) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize(map, deny_list)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| sanitize_value(item, deny_list)).collect())
        }
        scalar => scalar.clone(),
    }
}

fn is_denied<S: AsRef<str>>(key: &str, deny_list: &[S]) -> bool {
    deny_list.iter().any(|denied| denied.as_ref() == key)
}

/// Merge `source` into a copy of `target`
///
/// Objects present on both sides merge key by key; anything else in `source`
/// (arrays included) overwrites.
pub fn deep_merge(target: &Map<String, Value>, source: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = target.clone();

    for (key, value) in source {
        let next = match (merged.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(deep_merge(existing, incoming))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }

    merged
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
