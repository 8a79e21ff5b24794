//! Error types for the annotation pipeline.
//!
//! All failures funnel into a single [`NlpError`]. A failure anywhere inside
//! a `process` call aborts the whole call; there is no partial-result
//! recovery and no retry.

use thiserror::Error;

use crate::config::PipelineStage;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NlpError>;

/// Errors produced by the pipeline and its stage processors.
#[derive(Error, Debug)]
pub enum NlpError {
    /// A rule pattern failed to compile while building a processor.
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A stage received token and tag slices of different lengths.
    #[error("stage input mismatch: {0}")]
    InputMismatch(String),

    /// Generic processing failure wrapping the underlying stage message.
    ///
    /// `stage` and `code` are reserved for callers that want to attribute a
    /// failure to a specific stage; the core itself leaves them unset.
    #[error("Processing failed: {message}")]
    Processing {
        message: String,
        stage: Option<PipelineStage>,
        code: Option<String>,
    },
}

impl NlpError {
    /// Wraps an underlying stage message into a generic processing failure.
    pub fn processing(message: impl Into<String>) -> Self {
        NlpError::Processing {
            message: message.into(),
            stage: None,
            code: None,
        }
    }
}
