//! Error types for AIPA.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM providers, retrieval, prompts
//! and the tutor flow.

use thiserror::Error;

/// Unified error type for AIPA.
///
/// Library functions return `Result<T, AppError>`. The classifier never
/// returns an error at all; malformed input degrades to plain segments.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document loading and retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// A retrieval index was requested over zero chunks (or zero terms).
    #[error("Document is unreadable: no text to index")]
    EmptyCorpus,

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Tutor question bank and quiz errors
    #[error("Tutor error: {0}")]
    Tutor(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
