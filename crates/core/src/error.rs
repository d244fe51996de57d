//! Error types for the concierge workspace.
//!
//! This module defines a unified error enum covering configuration,
//! retrieval, prompt, chat, and upstream-service failures.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for the concierge pipeline.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An upstream service (embedding, vector index, completion model)
    /// is unreachable or returned a failure.
    #[error("Service '{service}' unavailable: {message}")]
    ServiceUnavailable { service: String, message: String },

    /// Passage retrieval and index errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt composition and example selection errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Query pipeline errors
    #[error("Chat error: {0}")]
    Chat(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap an upstream service failure with the service name.
    pub fn service_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::ServiceUnavailable { .. } => "service_unavailable",
            AppError::Retrieval(_) => "retrieval",
            AppError::Prompt(_) => "prompt",
            AppError::Chat(_) => "chat",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }
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

/// Well-formed error object surfaced to callers.
///
/// Unrecovered pipeline failures become exactly one of these, never a
/// raw stack trace or panic.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind
    pub kind: String,

    /// Human-readable message
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
