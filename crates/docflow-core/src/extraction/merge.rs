//! Merging of model responses into one schema-complete record.
//!
//! Three calling conventions are supported, each with its own input shape:
//!
//! - field groups: a sequence of `{field: value}` maps, one per call;
//! - table map: table name to a list of row maps, one call per table;
//! - unified: one object mixing scalar fields and `{"fieldType": "table"}` entries.
//!
//! Every mode ends with the declared targets back-filled so no declared
//! key or column is ever missing from the result.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::json::{is_raw_fallback, raw_fallback, recover_json, recover_or_raw};
use super::schema::{fields, tables};
use crate::models::record::{ExtractionRecord, RawFallback, RecordValue, Row, TableValue};
use crate::models::target::ExtractionTarget;

/// Merge field-group responses; later groups win on a shared key.
///
/// Values are stringified and trimmed, `null` becomes an empty string and
/// declared fields no group answered are set to null.
pub fn merge_field_groups(groups: &[Value], targets: &[ExtractionTarget]) -> ExtractionRecord {
    let mut record = ExtractionRecord::new();

    for (idx, group) in groups.iter().enumerate() {
        let Some(map) = group.as_object() else {
            warn!("field group {} is not an object, skipping", idx);
            continue;
        };
        for (key, value) in map {
            let text = scalar_text(value).unwrap_or_default();
            record.insert(key.as_str(), RecordValue::text(text));
        }
    }

    for field in fields(targets) {
        if let std::collections::btree_map::Entry::Vacant(slot) = record.entry(&field.field_name) {
            slot.insert(RecordValue::null());
        }
    }

    record
}

/// Merge per-table responses into `{"fieldType": "table", "items": [...]}` entries.
///
/// Every row is back-filled with the table's declared columns; a table whose
/// response could not be parsed is kept as its raw fallback.
pub fn merge_tables(responses: &BTreeMap<String, Value>, targets: &[ExtractionTarget]) -> ExtractionRecord {
    let declared = tables(targets);
    let mut record = ExtractionRecord::new();

    for (table, value) in responses {
        let columns = columns_of(&declared, table);
        let merged = table_value(value, &columns).unwrap_or_else(|| match value {
            Value::String(s) => RecordValue::Raw(RawFallback { raw: s.clone() }),
            other => RecordValue::text(other.to_string()),
        });
        record.insert(table.as_str(), merged);
    }

    for (table, columns) in &declared {
        let names: Vec<&str> = columns.iter().map(|c| c.field_name.as_str()).collect();
        fill_table(&mut record, table, &names);
    }

    record
}

/// Merge one unified response covering fields and tables together.
///
/// Scalars pass through as string-or-null, tables are back-filled as in
/// [`merge_tables`], and any other shape is kept as its JSON text.
pub fn merge_unified(response: &Value, targets: &[ExtractionTarget]) -> ExtractionRecord {
    let declared = tables(targets);
    let mut record = ExtractionRecord::new();

    match response.as_object() {
        Some(map) => {
            for (key, value) in map {
                let is_declared_table = declared.iter().any(|(name, _)| *name == key.as_str());
                let table = if is_declared_table || is_tagged_table(value) {
                    table_value(value, &columns_of(&declared, key))
                } else {
                    None
                };
                let merged = table.unwrap_or_else(|| RecordValue::Scalar(scalar_text(value)));
                record.insert(key.as_str(), merged);
            }
        }
        None => {
            warn!("unified response is not an object, keeping it as raw text");
            record.insert("raw", RecordValue::text(response.to_string()));
        }
    }

    ensure_complete(&mut record, targets);
    record
}

/// Back-fill every declared field, table and column missing from `record`.
pub fn ensure_complete(record: &mut ExtractionRecord, targets: &[ExtractionTarget]) {
    for field in fields(targets) {
        if let std::collections::btree_map::Entry::Vacant(slot) = record.entry(&field.field_name) {
            slot.insert(RecordValue::null());
        }
    }
    for (table, columns) in tables(targets) {
        let names: Vec<&str> = columns.iter().map(|c| c.field_name.as_str()).collect();
        fill_table(record, table, &names);
    }
}

/// Parse one field-group completion; unanswered fields are set to null.
///
/// Returns the `{"raw": ...}` fallback when no object can be recovered.
pub fn parse_field_group_response(raw: &str, group: &[&ExtractionTarget]) -> Value {
    match recover_json(raw) {
        Ok(Value::Object(mut map)) => {
            for field in group {
                map.entry(field.field_name.clone()).or_insert(Value::Null);
            }
            Value::Object(map)
        }
        Ok(_) => {
            warn!("field group response is not an object");
            raw_fallback(raw)
        }
        Err(e) => {
            warn!("field group response unusable: {}", e);
            raw_fallback(raw)
        }
    }
}

/// Parse one table completion into its row list.
///
/// Accepts `{"<table>": rows}`, a bare row array, a tagged table object or a
/// single row object. Returns the `{"raw": ...}` fallback when nothing parses.
pub fn parse_table_response(table: &str, raw: &str) -> Value {
    match recover_json(raw) {
        Ok(Value::Object(mut map)) => {
            let tagged = map
                .get("fieldType")
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("table"));
            if let Some(rows) = map.remove(table) {
                rows
            } else if tagged {
                map.remove("items").unwrap_or_else(|| Value::Array(Vec::new()))
            } else {
                Value::Array(vec![Value::Object(map)])
            }
        }
        Ok(rows @ Value::Array(_)) => rows,
        Ok(_) => {
            warn!("table '{}' response has unexpected shape", table);
            raw_fallback(raw)
        }
        Err(e) => {
            warn!("table '{}' response unusable: {}", table, e);
            raw_fallback(raw)
        }
    }
}

/// Parse a unified completion, degrading to the raw fallback.
pub fn parse_unified_response(raw: &str) -> Value {
    recover_or_raw(raw)
}

fn columns_of<'a>(declared: &[(&'a str, Vec<&'a ExtractionTarget>)], table: &str) -> Vec<&'a str> {
    declared
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, columns)| columns.iter().map(|c| c.field_name.as_str()).collect())
        .unwrap_or_default()
}

fn is_tagged_table(value: &Value) -> bool {
    value
        .get("fieldType")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("table"))
}

/// Interpret `value` as table content; `None` when it has no table shape.
fn table_value(value: &Value, columns: &[&str]) -> Option<RecordValue> {
    let rows = match value {
        Value::Null => return Some(RecordValue::Table(TableValue::default())),
        Value::Array(rows) => rows.as_slice(),
        Value::Object(_) if is_raw_fallback(value) => {
            let raw = value["raw"].as_str().unwrap_or_default().to_string();
            return Some(RecordValue::Raw(RawFallback { raw }));
        }
        Value::Object(map) if is_tagged_table(value) => match map.get("items") {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => &[],
        },
        Value::Object(_) => std::slice::from_ref(value),
        _ => return None,
    };

    let items = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| match row.as_object() {
            Some(map) => Some(backfilled_row(map, columns)),
            None => {
                debug!("dropping non-object table row {}", idx);
                None
            }
        })
        .collect();

    Some(RecordValue::Table(TableValue::new(items)))
}

fn backfilled_row(map: &Map<String, Value>, columns: &[&str]) -> Row {
    let mut row: Row = map
        .iter()
        .map(|(key, value)| (key.clone(), scalar_text(value)))
        .collect();
    for column in columns {
        row.entry((*column).to_string()).or_insert(None);
    }
    row
}

fn fill_table(record: &mut ExtractionRecord, table: &str, columns: &[&str]) {
    let value = record
        .entry(table)
        .or_insert_with(|| RecordValue::Table(TableValue::default()));
    if let RecordValue::Table(t) = value {
        for row in &mut t.items {
            for column in columns {
                row.entry((*column).to_string()).or_insert(None);
            }
        }
    }
}

/// String form of a model value: strings trimmed, other scalars printed,
/// containers serialized, `null` as `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
