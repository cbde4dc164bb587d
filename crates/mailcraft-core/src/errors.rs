//! Error types for failure handling across the email pipeline
//!
//! This module provides a unified error hierarchy that captures the failure
//! modes of an inherently unreliable text-generation oracle. Errors are
//! categorized by how the pipeline must react to them: configuration errors
//! are fatal and short-circuit before any model call, upstream errors
//! propagate to the stage that issued the call, parse failures are recovered
//! locally through documented fallbacks, and replacement failures discard the
//! whole edit transaction to protect document integrity.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Completion service error: {0}")]
    UpstreamError(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("No HTML could be recovered from model output")]
    ExtractionFailure,
    #[error("Section replacement failed: {0}")]
    ReplacementFailure(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::UpstreamError(err.to_string())
    }
}
