//! Core library for document field extraction.
//!
//! This crate provides:
//! - Page assembly of segmentation chunks into labelled document text
//! - Normalization of requested field/table schemas
//! - Merging of model completions into schema-complete records
//! - A heuristic marks parser for scored answer-sheet tables
//! - Job orchestration over pluggable segmentation, completion and storage

pub mod assembly;
pub mod error;
pub mod extraction;
pub mod marks;
pub mod models;
pub mod pipeline;

mod patterns;

pub use assembly::{AssembledDocument, Page, PageAssembler, assemble, extract_text, page_marker};
pub use error::{DocflowError, JsonRecoveryError, LlmError, Result, StoreError};
pub use extraction::{merge_field_groups, merge_tables, merge_unified, normalize, recover_json};
pub use marks::{Grid, extract_marks};
pub use models::chunk::{Chunk, chunks_from_value};
pub use models::config::DocflowConfig;
pub use models::marks::MarksTable;
pub use models::record::{ExtractionRecord, RecordValue, TableValue};
pub use models::target::{ExtractionTarget, FieldKind};
pub use pipeline::{CompletionClient, DocumentStore, JobOutcome, JobRequest, Pipeline, Segmenter};
