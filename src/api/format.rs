//! Decoding of backend response envelopes.
//!
//! The backend wraps most payloads as `{ "data": ... }` and pages as a Spring
//! `Page` (`content`, `totalPages`), but some endpoints answer with the bare
//! payload. Every shape seen in practice is accepted here so screens never
//! probe the JSON themselves.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::PortalResult;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 1,
        }
    }
}

/// Strip the `{ "data": ... }` envelope when present.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("data") && !obj["data"].is_null() => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a single enveloped or bare payload.
pub fn decode_data<T: DeserializeOwned>(value: Value) -> PortalResult<T> {
    Ok(serde_json::from_value(unwrap_data(value))?)
}

/// Decode a listing from any of the shapes:
/// `{data:{content,totalPages}}`, `{content,totalPages}`, `[...]`, `{data:[...]}`.
///
/// Anything else yields an empty page.
pub fn decode_page<T: DeserializeOwned>(value: Value) -> PortalResult<Page<T>> {
    let value = unwrap_data(value);

    let (items, total_pages) = match value {
        Value::Array(items) => (items, None),
        Value::Object(mut obj) => match obj.remove("content") {
            Some(Value::Array(items)) => {
                let total = obj
                    .get("totalPages")
                    .and_then(Value::as_u64)
                    .map(|n| n as u32);
                (items, total)
            }
            _ => {
                tracing::warn!("Unexpected listing format, showing no entries");
                return Ok(Page::empty());
            }
        },
        _ => {
            tracing::warn!("Unexpected listing format, showing no entries");
            return Ok(Page::empty());
        }
    };

    let content = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;

    Ok(Page {
        content,
        total_pages: total_pages.unwrap_or(1).max(1),
    })
}

/// Best human-readable message from an error body.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
