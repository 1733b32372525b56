//! Merged extraction record, ready to be stored verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One table row: column name to value (null when the model had none).
pub type Row = BTreeMap<String, Option<String>>;

/// Value stored under one record key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// `{"fieldType": "table", "items": [...]}`
    Table(TableValue),
    /// `{"raw": "..."}` for a unit whose model output was not JSON.
    Raw(RawFallback),
    /// Flat field value, `null` when the model had none.
    Scalar(Option<String>),
}

impl RecordValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Some(value.into()))
    }

    pub fn null() -> Self {
        Self::Scalar(None)
    }

    pub fn as_table(&self) -> Option<&TableValue> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Some(s)) => Some(s),
            _ => None,
        }
    }

    /// True when the value carries nothing the model extracted.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Scalar(None) => true,
            Self::Scalar(Some(s)) => s.is_empty(),
            Self::Table(table) => table.items.is_empty(),
            Self::Raw(_) => false,
        }
    }
}

/// Marker serialized as `"table"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableTag {
    #[default]
    #[serde(rename = "table")]
    Table,
}

/// Table entry of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableValue {
    pub field_type: TableTag,
    pub items: Vec<Row>,
}

impl TableValue {
    pub fn new(items: Vec<Row>) -> Self {
        Self {
            field_type: TableTag::Table,
            items,
        }
    }
}

/// Raw model text kept when no JSON could be recovered from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFallback {
    pub raw: String,
}

/// Field/table name to value mapping for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionRecord {
    values: BTreeMap<String, RecordValue>,
}

impl ExtractionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert, replacing any previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: RecordValue) {
        self.values.insert(key.into(), value);
    }

    pub(crate) fn entry(&mut self, key: &str) -> std::collections::btree_map::Entry<'_, String, RecordValue> {
        self.values.entry(key.to_string())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RecordValue)> {
        self.values.iter()
    }

    /// Key union of two records; `other` wins on a shared key.
    pub fn combine(mut self, other: ExtractionRecord) -> Self {
        self.values.extend(other.values);
        self
    }

    /// True when no value carries extracted content.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(RecordValue::is_blank)
    }

    /// True when none of `keys` carries extracted content; absent keys count
    /// as blank and keys outside `keys` (such as a `raw` fallback) are ignored.
    pub fn is_blank_for<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        keys.into_iter()
            .all(|key| self.values.get(key).is_none_or(RecordValue::is_blank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_wire_shape() {
        let mut row = Row::new();
        row.insert("col1".to_string(), Some("x".to_string()));
        row.insert("col2".to_string(), None);

        let mut record = ExtractionRecord::new();
        record.insert("Name", RecordValue::text("Bob"));
        record.insert("Age", RecordValue::null());
        record.insert("Items", RecordValue::Table(TableValue::new(vec![row])));
        record.insert(
            "Notes",
            RecordValue::Raw(RawFallback {
                raw: "not json".to_string(),
            }),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "Age": null,
                "Items": {"fieldType": "table", "items": [{"col1": "x", "col2": null}]},
                "Name": "Bob",
                "Notes": {"raw": "not json"}
            })
        );

        let back: ExtractionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_blank_record() {
        let mut record = ExtractionRecord::new();
        record.insert("a", RecordValue::null());
        record.insert("b", RecordValue::text(""));
        record.insert("t", RecordValue::Table(TableValue::default()));
        assert!(record.is_blank());

        record.insert("c", RecordValue::text("1"));
        assert!(!record.is_blank());
    }

    #[test]
    fn test_blank_for_declared_keys_ignores_raw() {
        let mut record = ExtractionRecord::new();
        record.insert("Name", RecordValue::null());
        record.insert("raw", RecordValue::text("NA"));
        assert!(!record.is_blank());
        assert!(record.is_blank_for(["Name", "Age"]));

        record.insert("Age", RecordValue::text("41"));
        assert!(!record.is_blank_for(["Name", "Age"]));
    }
}
