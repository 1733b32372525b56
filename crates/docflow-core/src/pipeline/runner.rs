//! The extraction job runner.

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::{CompletionClient, DocumentStore, JobOutcome, JobRequest, Segmenter};
use crate::assembly::PageAssembler;
use crate::error::DocflowError;
use crate::extraction::prompt::{field_group_prompt, table_prompt, unified_prompt};
use crate::extraction::schema::{self, fields, tables};
use crate::extraction::{
    ensure_complete, merge_field_groups, merge_tables, merge_unified, parse_field_group_response,
    parse_table_response, parse_unified_response,
};
use crate::models::config::{DocflowConfig, ExtractionMode};
use crate::models::persist::{CreditTransition, FileUpdate, JobStatus};
use crate::models::record::ExtractionRecord;
use crate::models::target::ExtractionTarget;

/// Completion text used when the completion call itself fails.
const UNAVAILABLE: &str = "NA";

/// Runs one job end to end: segment, assemble, extract, merge, persist.
pub struct Pipeline<'a> {
    config: &'a DocflowConfig,
    segmenter: &'a dyn Segmenter,
    llm: &'a dyn CompletionClient,
    store: &'a dyn DocumentStore,
}

/// Assembled text in the form it is prompted with and stored as.
struct DocumentText {
    full_text: Value,
    content: String,
    page_count: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a DocflowConfig,
        segmenter: &'a dyn Segmenter,
        llm: &'a dyn CompletionClient,
        store: &'a dyn DocumentStore,
    ) -> Self {
        Self {
            config,
            segmenter,
            llm,
            store,
        }
    }

    /// Run a job.
    ///
    /// Job-level failures (no text, nothing extracted, collaborator errors)
    /// reclaim the credit, flag the file and come back as
    /// [`JobOutcome::Failed`]; they are not returned as errors.
    pub fn run(&self, job: &JobRequest) -> JobOutcome {
        let start = Instant::now();
        info!("processing file {} (cluster {})", job.file_id, job.cluster_id);

        match self.process(job) {
            Ok((page_count, record)) => {
                self.settle(job, page_count, &record);
                debug!("job for file {} done in {:?}", job.file_id, start.elapsed());
                JobOutcome::Completed { page_count, record }
            }
            Err(e) => {
                let reason = e.to_string();
                error!("file {} failed: {}", job.file_id, reason);
                self.fail(job, &reason);
                JobOutcome::Failed { reason }
            }
        }
    }

    fn process(&self, job: &JobRequest) -> crate::Result<(usize, ExtractionRecord)> {
        let chunks = self.segmenter.segment(job)?;
        debug!("segmentation returned {} chunks", chunks.len());

        let document = self.document_text(&chunks);
        if document.page_count == 0 {
            return Err(DocflowError::EmptyDocument);
        }
        info!("{} pages assembled", document.page_count);

        let raw_schema = self.store.requested_fields(&job.user_id, &job.cluster_id)?;
        let targets = schema::normalize(&raw_schema);

        let record = if targets.is_empty() {
            warn!("cluster {} requests no fields", job.cluster_id);
            ExtractionRecord::new()
        } else {
            let record = self.extract(&targets, &document.content);
            let declared = fields(&targets)
                .into_iter()
                .map(|f| f.field_name.as_str())
                .chain(tables(&targets).into_iter().map(|(table, _)| table));
            if record.is_blank_for(declared) {
                return Err(DocflowError::BlankRecord);
            }
            record
        };

        let update = FileUpdate::completed(record.clone(), &document.full_text, document.page_count);
        self.store.save_extraction(&job.file_id, &update)?;

        Ok((document.page_count, record))
    }

    fn document_text(&self, chunks: &[crate::models::chunk::Chunk]) -> DocumentText {
        let assembler = PageAssembler::from_config(&self.config.assembly);

        if self.config.assembly.strict {
            let pages = assembler.assemble_strict(chunks);
            let page_count = pages.len();
            let full_text = json!(pages);
            DocumentText {
                content: full_text.to_string(),
                full_text,
                page_count,
            }
        } else {
            let doc = assembler.assemble(chunks);
            DocumentText {
                full_text: Value::String(doc.text.clone()),
                content: doc.text,
                page_count: doc.page_count,
            }
        }
    }

    fn extract(&self, targets: &[ExtractionTarget], content: &str) -> ExtractionRecord {
        match self.config.extraction.mode {
            ExtractionMode::Unified => {
                let raw = self.complete(&unified_prompt(targets, content));
                merge_unified(&parse_unified_response(&raw), targets)
            }
            ExtractionMode::FieldGroups => {
                let group_size = self.config.extraction.field_group_size.max(1);

                let groups: Vec<Value> = fields(targets)
                    .chunks(group_size)
                    .map(|group| {
                        let raw = self.complete(&field_group_prompt(group, content));
                        parse_field_group_response(&raw, group)
                    })
                    .collect();

                let table_rows: BTreeMap<String, Value> = tables(targets)
                    .into_iter()
                    .map(|(table, columns)| {
                        let raw = self.complete(&table_prompt(table, &columns, content));
                        (table.to_string(), parse_table_response(table, &raw))
                    })
                    .collect();

                let mut record =
                    merge_field_groups(&groups, targets).combine(merge_tables(&table_rows, targets));
                ensure_complete(&mut record, targets);
                record
            }
        }
    }

    fn complete(&self, prompt: &str) -> String {
        match self.llm.complete(prompt) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("completion failed: {}", e);
                UNAVAILABLE.to_string()
            }
        }
    }

    fn settle(&self, job: &JobRequest, page_count: usize, record: &ExtractionRecord) {
        if let Some(job_id) = &job.job_id {
            let summary = json!({
                "fileId": job.file_id,
                "pageCount": page_count,
                "values": record.len(),
            });
            if let Err(e) = self.store.set_job_status(&JobStatus::success(job_id, summary)) {
                warn!("job status update failed for {}: {}", job_id, e);
            }
        }

        if let Some(credit_id) = &job.credit_id {
            if let Err(e) = self
                .store
                .apply_credit(credit_id, &job.file_id, CreditTransition::Debit)
            {
                error!("credit {} not debited: {}", credit_id, e);
            }
        }
    }

    fn fail(&self, job: &JobRequest, reason: &str) {
        abandon(self.store, job, reason);
    }
}

/// Unwind a job that will not complete: reclaim its credit, flag the file
/// as failed and record the error status. Each step runs even when an
/// earlier one fails; store errors are logged.
pub fn abandon(store: &dyn DocumentStore, job: &JobRequest, reason: &str) {
    if let Some(credit_id) = &job.credit_id {
        if let Err(e) = store.apply_credit(credit_id, &job.file_id, CreditTransition::Reclaim) {
            warn!("credit reclaim skipped for {}: {}", credit_id, e);
        }
    }

    if let Err(e) = store.mark_failed(&job.file_id) {
        warn!("could not flag file {} as failed: {}", job.file_id, e);
    }

    if let Some(job_id) = &job.job_id {
        if let Err(e) = store.set_job_status(&JobStatus::error(job_id, reason)) {
            warn!("job status update failed for {}: {}", job_id, e);
        }
    }
}
