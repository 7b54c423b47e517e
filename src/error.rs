//! Error types for flashcard generation, file uploads and the summarizer.
//!
//! Every variant is recoverable: callers either re-prompt the user or fall
//! back to local synthesis.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Please enter some text to generate flashcards")]
    EmptyInput,

    #[error("Please enter a number between 1 and 50 (got {0})")]
    InvalidCount(i64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Webhook did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    #[error("Error reading file: {0}")]
    ExtractionError(String),
}

impl GenerationError {
    /// Failures of the remote attempt; these switch the pipeline to local synthesis.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            GenerationError::NetworkError(_)
                | GenerationError::Timeout(_)
                | GenerationError::InvalidResponseShape(_)
        )
    }
}

/// Rejections raised while validating an uploaded document. No request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please upload a PDF or Word document (.pdf, .doc, .docx); got '{0}'")]
    UnsupportedType(String),

    #[error("File size must be less than 10MB ({size} bytes > {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Failed to read file: {0}")]
    InvalidEncoding(String),

    #[error("Please upload a file")]
    MissingFile,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Please enter a valid YouTube video URL.")]
    InvalidUrl,

    #[error("Summary webhook is not configured")]
    NotConfigured,

    #[error("Server error: {0}")]
    Server(u16),

    #[error("{0}")]
    Network(String),

    #[error("Summary webhook did not answer within {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Anything that can stop a generation request before cards are produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}
