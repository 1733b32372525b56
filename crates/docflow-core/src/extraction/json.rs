//! Best-effort JSON recovery from model output.
//!
//! Models are asked for bare JSON but regularly wrap it in prose or code
//! fences. Recovery tries, in order: the slice from the first `{` to the last
//! `}`, the whole text with fences removed, the slice from the first `[` to
//! the last `]`, and finally the first complete value starting at the first
//! `{` (prose holding several separate objects yields the first one).

use serde_json::{Value, json};

use crate::error::JsonRecoveryError;
use crate::patterns::{CODE_FENCE, JSON_ARRAY, JSON_OBJECT};

/// Recover a JSON value from raw model text.
pub fn recover_json(raw: &str) -> Result<Value, JsonRecoveryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JsonRecoveryError::Empty);
    }

    let object_err = match JSON_OBJECT.find(trimmed) {
        Some(m) => match serde_json::from_str::<Value>(m.as_str()) {
            Ok(value) => return Ok(value),
            Err(e) => Some(e.to_string()),
        },
        None => None,
    };

    let unfenced = CODE_FENCE.replace_all(trimmed, "");
    let whole_err = match serde_json::from_str::<Value>(unfenced.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };

    if let Some(m) = JSON_ARRAY.find(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(m.as_str()) {
            return Ok(value);
        }
    }

    if let Some(value) = first_object(trimmed) {
        return Ok(value);
    }

    Err(JsonRecoveryError::Unparseable(object_err.unwrap_or(whole_err)))
}

/// First complete object starting at the first `{`, ignoring what follows.
fn first_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

/// Recover a JSON value, or `{"raw": <original text>}` when none is found.
pub fn recover_or_raw(raw: &str) -> Value {
    recover_json(raw).unwrap_or_else(|_| raw_fallback(raw))
}

/// The fallback value for unrecoverable model output.
pub fn raw_fallback(raw: &str) -> Value {
    json!({ "raw": raw })
}

/// True when `value` is exactly a `{"raw": "..."}` fallback.
pub fn is_raw_fallback(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.len() == 1 && map.get("raw").is_some_and(Value::is_string))
}
