//! Error types for the guide RAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Embedding provider or vector index could not serve the call
    #[error("{dependency} unavailable: {message}")]
    DependencyUnavailable { dependency: String, message: String },

    /// Full retrieval ranked no chunks for the question
    #[error("No relevant content found")]
    NoContentFound,

    /// The language model failed or produced no text
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// The corpus root contained no documents
    #[error("Corpus at '{}' contains no documents", .0.display())]
    CorpusEmpty(PathBuf),

    /// A corpus refresh is already running
    #[error("A corpus refresh is already in progress")]
    RefreshInProgress,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Flat classification of [`Error`] for callers that map failures to user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DependencyUnavailable,
    NoContentFound,
    GenerationFailure,
    CorpusEmpty,
    RefreshInProgress,
    Configuration,
    Internal,
}

impl Error {
    /// Create a dependency-unavailable error
    pub fn dependency(dependency: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            dependency: dependency.into(),
            message: message.into(),
        }
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailure(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DependencyUnavailable { .. } => ErrorKind::DependencyUnavailable,
            Error::NoContentFound => ErrorKind::NoContentFound,
            Error::GenerationFailure(_) => ErrorKind::GenerationFailure,
            Error::CorpusEmpty(_) => ErrorKind::CorpusEmpty,
            Error::RefreshInProgress => ErrorKind::RefreshInProgress,
            Error::Config(_) => ErrorKind::Configuration,
            Error::Http(_) => ErrorKind::DependencyUnavailable,
            Error::Io(_) | Error::Json(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the pipeline answers with the fallback message instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::NoContentFound | ErrorKind::CorpusEmpty)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::GenerationFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::RefreshInProgress => StatusCode::CONFLICT,
            ErrorKind::Configuration => StatusCode::BAD_REQUEST,
            ErrorKind::NoContentFound | ErrorKind::CorpusEmpty => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("Request failed ({:?}): {}", kind, self);

        let body = Json(json!({
            "error": {
                "type": kind,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinguishable() {
        let errors = [
            Error::dependency("ollama", "connection refused"),
            Error::NoContentFound,
            Error::generation("empty output"),
            Error::CorpusEmpty(PathBuf::from("raw_docs")),
            Error::RefreshInProgress,
            Error::Config("bad".to_string()),
            Error::internal("boom"),
        ];

        let kinds: Vec<ErrorKind> = errors.iter().map(Error::kind).collect();
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_only_empty_results_are_recoverable() {
        assert!(Error::NoContentFound.is_recoverable());
        assert!(Error::CorpusEmpty(PathBuf::from("x")).is_recoverable());
        assert!(!Error::generation("x").is_recoverable());
        assert!(!Error::dependency("index", "down").is_recoverable());
    }

    #[test]
    fn test_status_mapping() {
        let resp = Error::dependency("ollama", "down").into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = Error::generation("blank").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = Error::RefreshInProgress.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
