//! Query serializer
//!
//! Every top-level key of the payload becomes one parameter whose value is
//! the JSON encoding of that key's value, percent-encoded. Nested structures
//! are not exploded into bracket notation; the backend `json.loads` each
//! parameter. Serialization never fails.

use serde_json::{Map, Value};

use super::root::FilterGroupRoot;
use crate::error::{Result, SonarError};
use crate::filters::FilterGroupFilters;

/// Encode a payload as `?filters=...&limit=...`
pub fn to_query_string(root: &FilterGroupRoot) -> String {
    let mut root = root.clone();
    strip_empty_values(&mut root.filters);

    match serde_json::to_value(&root) {
        Ok(Value::Object(map)) => encode_json_params(&map),
        Ok(other) => {
            tracing::warn!(value = %other, "payload did not serialize to an object");
            String::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize query payload");
            String::new()
        }
    }
}

/// Drop top-level AND records whose value was emptied, e.g. a half-picked date range
fn strip_empty_values(filters: &mut FilterGroupFilters) {
    let before = filters.and_filter.len();
    filters.and_filter.retain(|record| !record.has_empty_value());
    let dropped = before - filters.and_filter.len();
    if dropped > 0 {
        tracing::debug!(dropped, "stripped filters with empty values");
    }
}

/// JSON-per-key encoding of an object; no keys gives `""`
pub fn encode_json_params(params: &Map<String, Value>) -> String {
    if params.is_empty() {
        return String::new();
    }
    let encoded: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.trim()),
                urlencoding::encode(&json_or_plain(value))
            )
        })
        .collect();
    format!("?{}", encoded.join("&"))
}

/// JSON text of a value; an absent (null) value falls back to the empty string
fn json_or_plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode a query string the way the backend does: each parameter is
/// JSON-parsed, and plain text that is not JSON is kept as a string.
/// Unknown keys are ignored.
pub fn parse_query_string(query: &str) -> Result<FilterGroupRoot> {
    let query = query.trim_start_matches('?');
    let mut params = Map::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key, raw_key)?;
        let value = decode_component(raw_value, &key)?;
        let parsed = serde_json::from_str(&value).unwrap_or(Value::String(value));
        params.insert(key, parsed);
    }

    serde_json::from_value(Value::Object(params)).map_err(|e| SonarError::Json {
        source: e,
        context: "Query string does not describe a filter payload".to_string(),
    })
}

fn decode_component(raw: &str, key: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| SonarError::QueryDecode {
            key: key.to_string(),
            message: e.to_string(),
        })
}
