//! Error types shared across the exam core.

use thiserror::Error;

/// Errors raised by the session core.
///
/// Only `Validation` is expected to reach the user (via a failed extraction);
/// the rest indicate misuse of the core by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("invalid quiz: {0}")]
    Validation(String),
    #[error("option {option_index} is out of range for question {question_id} ({option_count} options)")]
    InvalidSelection {
        question_id: String,
        option_index: usize,
        option_count: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("operation requires phase {expected}, session is {actual}")]
    InvalidState { expected: String, actual: String },
    #[error("question not found: {0}")]
    NotFound(String),
}

/// Errors raised while admitting a document or talking to the extraction service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("only PDF documents can be uploaded")]
    NotPdf,
    #[error("document is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("document is empty")]
    Empty,
    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("extraction is not configured (set EXAMDESK_API_KEY)")]
    Disabled,
    #[error("extraction service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("extraction service returned an empty response")]
    EmptyResponse,
    #[error("Failed to extract questions. The PDF structure might be too complex.")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ExamError),
}

/// Errors raised while exporting a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unknown report format for {0} (use .yaml, .yml or .json)")]
    UnknownFormat(String),
}
