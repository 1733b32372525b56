//! Records handed to the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::ExtractionRecord;

/// Processing state of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Completed,
    Failed,
}

/// Update written to a file's document after a successful extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpdate {
    pub extracted_values: ExtractionRecord,
    /// Editable copy of `extracted_values`; starts identical.
    pub updated_extracted_values: ExtractionRecord,
    pub processing_status: ProcessingStatus,
    pub extracted_text: String,
    pub page_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl FileUpdate {
    pub fn completed(record: ExtractionRecord, full_text: &Value, page_count: usize) -> Self {
        Self {
            updated_extracted_values: record.clone(),
            extracted_values: record,
            processing_status: ProcessingStatus::Completed,
            extracted_text: stored_text(full_text),
            page_count,
            updated_at: Utc::now(),
        }
    }
}

/// Coerce document text to a string for storage.
///
/// Strings pass through; anything else is stored as its JSON serialization.
pub fn stored_text(full_text: &Value) -> String {
    match full_text {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// State of a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Success,
    Error,
}

/// Job status document, upserted by job id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(rename = "job_id")]
    pub job_id: String,
    pub status: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl JobStatus {
    pub fn success(job_id: impl Into<String>, summary: Value) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Success,
            message: None,
            summary: Some(summary),
            updated_at: Utc::now(),
        }
    }

    pub fn error(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Error,
            message: Some(message.into()),
            summary: None,
            updated_at: Utc::now(),
        }
    }
}

/// The two credit ledger transitions the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditTransition {
    /// Confirm the credit issued at job start.
    Debit,
    /// Give the credit back after a failed job.
    Reclaim,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_text_coercion() {
        assert_eq!(stored_text(&json!("page text")), "page text");
        assert_eq!(stored_text(&json!(null)), "");
        assert_eq!(stored_text(&json!({"1": "a"})), r#"{"1":"a"}"#);
        assert_eq!(stored_text(&json!(["é"])), r#"["é"]"#);
    }

    #[test]
    fn test_file_update_shape() {
        let update = FileUpdate::completed(ExtractionRecord::new(), &json!("t"), 2);
        let value = serde_json::to_value(&update).unwrap();

        assert_eq!(value["processingStatus"], "Completed");
        assert_eq!(value["extractedText"], "t");
        assert_eq!(value["pageCount"], 2);
        assert!(value.get("updatedExtractedValues").is_some());
    }
}
