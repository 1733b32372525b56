//! Chunk records as returned by the segmentation service.
//!
//! Integrations disagree on the shape of a chunk, so every field is optional
//! and deserialized leniently: a field with an unexpected type is treated as
//! absent instead of failing the whole chunk.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// One unit of extracted content from the segmentation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Page this chunk belongs to, when the service reports it at chunk level.
    #[serde(
        default,
        alias = "pageNumber",
        deserialize_with = "lenient_page",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<u32>,

    /// Model-refined text.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,

    /// Raw text content.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Sub-segments, each with its own content and page metadata.
    #[serde(default, deserialize_with = "lenient_segments", skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Segment>,

    /// Markup rendering of the chunk.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Free-form metadata; may carry the page number.
    #[serde(default, deserialize_with = "lenient_metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
}

/// A sub-unit within a chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(
        default,
        alias = "pageNumber",
        deserialize_with = "lenient_page",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<u32>,

    #[serde(default, deserialize_with = "lenient_metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
}

/// Metadata mapping; only the page number is of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(
        default,
        alias = "pageNumber",
        deserialize_with = "lenient_page",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<u32>,
}

impl Chunk {
    /// Chunk carrying only raw content.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Set the chunk-level page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }
}

/// Read a chunk collection out of a segmentation task payload.
///
/// Accepts a bare array, `{"chunks": [...]}` or `{"output": {"chunks": [...]}}`.
/// Entries that are not objects are skipped.
pub fn chunks_from_value(payload: &Value) -> Vec<Chunk> {
    let list = payload
        .as_array()
        .or_else(|| payload.get("chunks").and_then(Value::as_array))
        .or_else(|| {
            payload
                .get("output")
                .and_then(|o| o.get("chunks"))
                .and_then(Value::as_array)
        });

    let Some(list) = list else {
        debug!("payload carries no chunk list");
        return Vec::new();
    };

    list.iter()
        .enumerate()
        .filter_map(|(idx, raw)| match serde_json::from_value::<Chunk>(raw.clone()) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                warn!("skipping chunk {}: {}", idx, e);
                None
            }
        })
        .collect()
}

/// Interpret a JSON value as a page number.
pub(crate) fn page_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(page_from_value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_segments<'de, D>(deserializer: D) -> Result<Vec<Segment>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<PageMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tolerates_schema_drift() {
        let chunk: Chunk = serde_json::from_value(json!({
            "pageNumber": "4",
            "content": 17,
            "segments": [
                {"content": "a", "page_number": 4.0},
                "not a segment",
                {"metadata": {"page_number": 5}}
            ],
            "metadata": "opaque",
            "embed": "ignored"
        }))
        .unwrap();

        assert_eq!(chunk.page_number, Some(4));
        assert_eq!(chunk.content, None);
        assert_eq!(chunk.segments.len(), 2);
        assert_eq!(chunk.segments[0].page_number, Some(4));
        assert_eq!(
            chunk.segments[1].metadata.as_ref().and_then(|m| m.page_number),
            Some(5)
        );
        assert!(chunk.metadata.is_none());
    }

    #[test]
    fn test_chunks_from_payload_shapes() {
        let bare = json!([{"content": "x"}]);
        let wrapped = json!({"chunks": [{"content": "x"}]});
        let task = json!({"output": {"chunks": [{"content": "x"}, 3]}});

        assert_eq!(chunks_from_value(&bare).len(), 1);
        assert_eq!(chunks_from_value(&wrapped).len(), 1);
        assert_eq!(chunks_from_value(&task).len(), 1);
        assert!(chunks_from_value(&json!({"status": "Failed"})).is_empty());
    }

    #[test]
    fn test_page_from_value() {
        assert_eq!(page_from_value(&json!(3)), Some(3));
        assert_eq!(page_from_value(&json!(" 12 ")), Some(12));
        assert_eq!(page_from_value(&json!(2.5)), None);
        assert_eq!(page_from_value(&json!(-1)), None);
        assert_eq!(page_from_value(&json!(null)), None);
    }
}
