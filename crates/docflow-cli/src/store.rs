//! Directory-backed document store.
//!
//! Layout under the root:
//!
//! ```text
//! clusters/<cluster_id>.json   {"userId": "...", "requestedFields": [...]}
//! files/<file_id>.json         file document, extraction fields merged in
//! jobs/<job_id>.json           latest job status
//! credits/<credit_id>.json     issued credit; removed on reclaim
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::debug;

use docflow_core::error::StoreError;
use docflow_core::models::persist::{CreditTransition, FileUpdate, JobStatus, ProcessingStatus};
use docflow_core::pipeline::DocumentStore;

pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join(kind).join(format!("{}.json", id))
    }

    fn read(&self, kind: &'static str, id: &str) -> Result<Map<String, Value>, StoreError> {
        let path = self.path(kind, id);
        if !path.exists() {
            return Err(StoreError::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(backend)?;
        match serde_json::from_str(&content).map_err(backend)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Backend(format!("{} is not an object", path.display()))),
        }
    }

    fn write(&self, kind: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        let path = self.path(kind, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(backend)?;
        }
        let content = serde_json::to_string_pretty(document).map_err(backend)?;
        fs::write(&path, content).map_err(backend)?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    /// Merge `fields` into the document, creating it when absent.
    fn upsert(&self, kind: &'static str, id: &str, fields: Value) -> Result<(), StoreError> {
        let mut document = match self.read(kind, id) {
            Ok(map) => map,
            Err(StoreError::NotFound { .. }) => Map::new(),
            Err(e) => return Err(e),
        };
        if let Value::Object(fields) = fields {
            document.extend(fields);
        }
        self.write(kind, id, &Value::Object(document))
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Ids become file names directly under their kind directory.
fn require(id: &str, name: &'static str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::MissingId(name));
    }
    if id.contains(['/', '\\', '\0']) || id.starts_with('.') || id.contains("..") {
        return Err(StoreError::InvalidId {
            name,
            id: id.to_string(),
        });
    }
    Ok(())
}

impl DocumentStore for DirectoryStore {
    fn requested_fields(&self, user_id: &str, cluster_id: &str) -> Result<Vec<Value>, StoreError> {
        require(user_id, "userId")?;
        require(cluster_id, "clusterId")?;

        let cluster = self.read("clusters", cluster_id)?;
        let owner = cluster.get("userId").and_then(Value::as_str);
        if owner.is_some_and(|owner| owner != user_id) {
            return Err(StoreError::NotFound {
                kind: "cluster",
                id: cluster_id.to_string(),
            });
        }

        Ok(cluster
            .get("requestedFields")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn save_extraction(&self, file_id: &str, update: &FileUpdate) -> Result<(), StoreError> {
        require(file_id, "fileId")?;
        let fields = serde_json::to_value(update).map_err(backend)?;
        self.upsert("files", file_id, fields)
    }

    fn mark_failed(&self, file_id: &str) -> Result<(), StoreError> {
        require(file_id, "fileId")?;
        let fields = json!({
            "processingStatus": ProcessingStatus::Failed,
            "updatedAt": Utc::now(),
        });
        self.upsert("files", file_id, fields)
    }

    fn set_job_status(&self, status: &JobStatus) -> Result<(), StoreError> {
        require(&status.job_id, "job_id")?;
        let document = serde_json::to_value(status).map_err(backend)?;
        self.write("jobs", &status.job_id, &document)
    }

    fn apply_credit(
        &self,
        credit_id: &str,
        file_id: &str,
        transition: CreditTransition,
    ) -> Result<(), StoreError> {
        require(credit_id, "creditId")?;

        match transition {
            CreditTransition::Debit => {
                // must have been issued at job start
                self.read("credits", credit_id)?;
                self.upsert(
                    "credits",
                    credit_id,
                    json!({
                        "type": "debited",
                        "fileId": file_id,
                        "updatedAt": Utc::now(),
                    }),
                )
            }
            CreditTransition::Reclaim => {
                let path = self.path("credits", credit_id);
                if !path.exists() {
                    return Err(StoreError::NotFound {
                        kind: "credit",
                        id: credit_id.to_string(),
                    });
                }
                fs::remove_file(&path).map_err(backend)
            }
        }
    }
}
