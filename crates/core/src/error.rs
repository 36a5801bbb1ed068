//! Error types for the adaptive RAG workspace.
//!
//! One enum covers every failure category. The loop distinguishes three
//! families: structured-response parse failures (routing, grading), failures
//! of an external collaborator (generator, retriever, web search, timeouts)
//! and ambient errors (configuration, I/O, prompts).

use thiserror::Error;

/// Unified error type.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text generator failures (transport, HTTP status, malformed envelope)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retriever and index failures
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search failures
    #[error("Web search error: {0}")]
    WebSearch(String),

    /// The routing response had no usable `datasource`
    #[error("Routing error: {0}")]
    Routing(String),

    /// A grading response had no usable `binary_score`
    #[error("Grading error ({grader}): {message}")]
    Grading { grader: String, message: String },

    /// An external call did not finish within the configured timeout
    #[error("Timed out after {secs}s waiting for {operation}")]
    Timeout { operation: String, secs: u64 },

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a grading error for the named grader.
    pub fn grading(grader: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Grading {
            grader: grader.into(),
            message: message.into(),
        }
    }

    /// True for malformed routing or grading responses.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, AppError::Routing(_) | AppError::Grading { .. })
    }

    /// True when an external collaborator failed or hung.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            AppError::Llm(_)
                | AppError::Knowledge(_)
                | AppError::WebSearch(_)
                | AppError::Timeout { .. }
        )
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

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
