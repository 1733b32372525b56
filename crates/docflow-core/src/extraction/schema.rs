//! Expansion of a cluster's requested fields into extraction targets.

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::target::{DEFAULT_DATATYPE, ExtractionTarget, FieldKind, RequestedField};

/// Expand raw schema entries into a flat list of targets.
///
/// Flat fields map to one target each; a table maps to one target per
/// column, in column order, with `table_name` set. Entries with a blank name,
/// tables without columns and entries that do not deserialize are dropped.
pub fn normalize(raw_schema: &[Value]) -> Vec<ExtractionTarget> {
    let mut targets = Vec::new();

    for (idx, raw) in raw_schema.iter().enumerate() {
        let entry: RequestedField = match serde_json::from_value(raw.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping schema entry {}: {}", idx, e);
                continue;
            }
        };

        let name = entry.field_name.as_deref().unwrap_or("").trim();
        if name.is_empty() {
            debug!("skipping schema entry {} without a name", idx);
            continue;
        }

        match parse_kind(entry.field_type.as_deref()) {
            Some(FieldKind::Field) => targets.push(target_from(&entry, name, None)),
            Some(FieldKind::Table) => expand_table(&entry, name, &mut targets),
            None => warn!(
                "skipping '{}': unknown fieldType {:?}",
                name,
                entry.field_type.as_deref().unwrap_or_default()
            ),
        }
    }

    targets
}

fn parse_kind(raw: Option<&str>) -> Option<FieldKind> {
    match raw.map(str::trim) {
        None | Some("") => Some(FieldKind::Field),
        Some(kind) if kind.eq_ignore_ascii_case("field") => Some(FieldKind::Field),
        Some(kind) if kind.eq_ignore_ascii_case("table") => Some(FieldKind::Table),
        Some(_) => None,
    }
}

fn expand_table(entry: &RequestedField, table_name: &str, targets: &mut Vec<ExtractionTarget>) {
    let columns = entry.table_data.as_deref().unwrap_or_default();
    if columns.is_empty() {
        warn!("table '{}' has no columns defined", table_name);
        return;
    }

    for raw in columns {
        let Ok(column) = serde_json::from_value::<RequestedField>(raw.clone()) else {
            warn!("skipping malformed column in table '{}'", table_name);
            continue;
        };
        let name = column.field_name.as_deref().unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        targets.push(target_from(&column, name, Some(table_name)));
    }
}

fn target_from(entry: &RequestedField, name: &str, table: Option<&str>) -> ExtractionTarget {
    let datatype = entry
        .field_datatype
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DATATYPE);

    ExtractionTarget {
        field_type: if table.is_some() { FieldKind::Table } else { FieldKind::Field },
        field_name: name.to_string(),
        field_datatype: datatype.to_string(),
        field_description: entry.field_description.clone().unwrap_or_default(),
        field_example: entry.field_example.clone().unwrap_or_default(),
        table_name: table.map(str::to_string),
    }
}

/// Flat-field targets, in schema order.
pub fn fields(targets: &[ExtractionTarget]) -> Vec<&ExtractionTarget> {
    targets.iter().filter(|t| !t.is_table_column()).collect()
}

/// Table columns grouped by table, tables in first-seen order.
pub fn tables(targets: &[ExtractionTarget]) -> Vec<(&str, Vec<&ExtractionTarget>)> {
    let mut grouped: Vec<(&str, Vec<&ExtractionTarget>)> = Vec::new();

    for target in targets.iter().filter(|t| t.is_table_column()) {
        let table = target.table_name.as_deref().unwrap_or_default();
        match grouped.iter_mut().find(|(name, _)| *name == table) {
            Some((_, columns)) => columns.push(target),
            None => grouped.push((table, vec![target])),
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flat_field_defaults() {
        let targets = normalize(&[json!({"fieldName": " Name "})]);

        assert_eq!(targets, vec![ExtractionTarget::field("Name")]);
        assert_eq!(targets[0].field_datatype, "String");
    }

    #[test]
    fn test_table_expands_in_order() {
        let raw = vec![
            json!({"fieldName": "Invoice No", "fieldDatatype": "Number", "fieldDescription": "id"}),
            json!({
                "fieldType": "table",
                "fieldName": "Items",
                "tableData": [
                    {"fieldName": "Qty", "fieldDatatype": "Number"},
                    {"fieldName": "  "},
                    {"fieldName": "Price", "fieldDescription": "unit price"}
                ]
            }),
            json!({"fieldName": "Date"}),
        ];
        let targets = normalize(&raw);

        let names: Vec<_> = targets.iter().map(|t| t.field_name.as_str()).collect();
        assert_eq!(names, vec!["Invoice No", "Qty", "Price", "Date"]);
        assert_eq!(targets[0].field_datatype, "Number");
        assert_eq!(targets[0].field_description, "id");
        assert_eq!(targets[1].table_name.as_deref(), Some("Items"));
        assert_eq!(targets[1].field_type, FieldKind::Table);
        assert_eq!(targets[2].field_description, "unit price");
        assert_eq!(targets[3].table_name, None);
    }

    #[test]
    fn test_drops_invalid_entries() {
        let raw = vec![
            json!({"fieldName": ""}),
            json!({"fieldType": "table", "fieldName": "Empty", "tableData": []}),
            json!({"fieldType": "table", "fieldName": "NoData"}),
            json!({"fieldType": "chart", "fieldName": "Pie"}),
            json!({"fieldName": 12}),
            json!("not an object"),
            json!({"fieldName": "Kept"}),
        ];

        assert_eq!(normalize(&raw), vec![ExtractionTarget::field("Kept")]);
    }

    #[test]
    fn test_grouping_helpers() {
        let targets = vec![
            ExtractionTarget::field("a"),
            ExtractionTarget::column("T1", "x"),
            ExtractionTarget::column("T2", "y"),
            ExtractionTarget::column("T1", "z"),
        ];

        assert_eq!(fields(&targets).len(), 1);
        let grouped = tables(&targets);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "T1");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "T2");
    }
}
