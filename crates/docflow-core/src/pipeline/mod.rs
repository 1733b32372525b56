//! Job orchestration against the segmentation, completion and storage
//! collaborators.
//!
//! The collaborators are traits so the orchestration can run against real
//! services, local files or in-memory fakes alike.

mod runner;

pub use runner::{Pipeline, abandon};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LlmError, StoreError};
use crate::models::chunk::Chunk;
use crate::models::persist::{CreditTransition, FileUpdate, JobStatus};
use crate::models::record::ExtractionRecord;

/// Identifies one file-processing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub user_id: String,
    pub cluster_id: String,
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobOutcome {
    Completed {
        page_count: usize,
        record: ExtractionRecord,
    },
    Failed {
        reason: String,
    },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Produces the chunk stream for a file.
pub trait Segmenter {
    fn segment(&self, job: &JobRequest) -> crate::Result<Vec<Chunk>>;
}

/// Turns a prompt into a text completion.
pub trait CompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Persistence for schemas, results, job status and credits.
pub trait DocumentStore {
    /// Raw requested-field entries of a user's cluster.
    fn requested_fields(&self, user_id: &str, cluster_id: &str) -> Result<Vec<Value>, StoreError>;

    /// Write a completed extraction onto the file's document.
    fn save_extraction(&self, file_id: &str, update: &FileUpdate) -> Result<(), StoreError>;

    /// Flag a file as failed.
    fn mark_failed(&self, file_id: &str) -> Result<(), StoreError>;

    /// Insert or replace the status of a job.
    fn set_job_status(&self, status: &JobStatus) -> Result<(), StoreError>;

    /// Apply a credit transition for the file.
    fn apply_credit(
        &self,
        credit_id: &str,
        file_id: &str,
        transition: CreditTransition,
    ) -> Result<(), StoreError>;
}
