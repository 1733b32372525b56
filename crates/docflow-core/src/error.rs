//! Error types for the docflow-core library.
//!
//! The transformation functions (assembly, normalization, merging, marks
//! parsing) are total and never return these. Errors only come out of the
//! collaborator seams: configuration, the completion client and the store.

use thiserror::Error;

/// Main error type for the docflow library.
#[derive(Error, Debug)]
pub enum DocflowError {
    /// Completion (LLM) collaborator failure.
    #[error("completion error: {0}")]
    Llm(#[from] LlmError),

    /// Persistence collaborator failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Segmentation collaborator failure.
    #[error("segmentation error: {0}")]
    Segmentation(String),

    /// Assembly produced no page text.
    #[error("extraction produced no text")]
    EmptyDocument,

    /// The model answered every requested field and table with nothing.
    #[error("no field or table value extracted")]
    BlankRecord,

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a completion client.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The endpoint could not be reached.
    #[error("request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered but the body had no completion in it.
    #[error("empty completion")]
    Empty,

    /// Missing credentials or endpoint settings.
    #[error("client not configured: {0}")]
    NotConfigured(String),
}

/// Errors raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A required identifier was not supplied.
    #[error("missing identifier: {0}")]
    MissingId(&'static str),

    /// An identifier that cannot name a single stored document.
    #[error("invalid {name}: {id:?}")]
    InvalidId { name: &'static str, id: String },

    /// Backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Failure to recover a JSON object from model output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonRecoveryError {
    /// The text is blank.
    #[error("model output is empty")]
    Empty,

    /// Neither the brace-delimited slice nor the whole text parsed.
    #[error("no JSON value recoverable: {0}")]
    Unparseable(String),
}

/// Result type for the docflow library.
pub type Result<T> = std::result::Result<T, DocflowError>;
