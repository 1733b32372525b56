//! Requested-field schema entries and the normalized extraction targets.

use serde::{Deserialize, Serialize};

/// Whether a target is a flat field or a column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Field,
    Table,
}

/// One normalized field or table column the pipeline must fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionTarget {
    pub field_type: FieldKind,
    pub field_name: String,
    pub field_datatype: String,
    pub field_description: String,
    #[serde(default)]
    pub field_example: String,
    /// Owning table, set for table columns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl ExtractionTarget {
    /// Flat field with default datatype and no description.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field_type: FieldKind::Field,
            field_name: name.into(),
            field_datatype: DEFAULT_DATATYPE.to_string(),
            field_description: String::new(),
            field_example: String::new(),
            table_name: None,
        }
    }

    /// Column of `table` with default datatype and no description.
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_type: FieldKind::Table,
            table_name: Some(table.into()),
            ..Self::field(name)
        }
    }

    pub fn is_table_column(&self) -> bool {
        self.field_type == FieldKind::Table
    }
}

/// Datatype assumed when the schema entry does not name one.
pub const DEFAULT_DATATYPE: &str = "String";

/// A schema entry as stored for a cluster, before normalization.
///
/// Table entries carry their columns in `table_data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestedField {
    #[serde(default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default, alias = "fieldDataType")]
    pub field_datatype: Option<String>,
    #[serde(default)]
    pub field_description: Option<String>,
    #[serde(default)]
    pub field_example: Option<String>,
    #[serde(default)]
    pub table_data: Option<Vec<serde_json::Value>>,
}
