//! Unified error handling for the trendlens crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`TrendlensErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::llm::error::LlmError;
pub use crate::trends::error::FetchError;

/// Common trait for all trendlens error types
///
/// This trait provides a unified interface for error handling across
/// all modules, enabling consistent error processing strategies.
pub trait TrendlensErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later identical call may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get description for user-facing messages
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Payload and normalization errors
    Data,
    /// Text-completion backend errors
    Llm,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get description for the category
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Data => "data error",
            Self::Llm => "text-completion error",
            Self::Config => "configuration error",
            Self::Other => "error",
        }
    }
}

/// Unified error type for the trendlens crate
///
/// This enum wraps all domain-specific errors, providing a single error type
/// that can be used across module boundaries while preserving the detailed
/// error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Trends fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Text-completion backend errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TrendlensErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Llm(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Http(_) => true, // HTTP errors are often transient
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => e.user_message(),
            Self::Llm(e) => e.user_message(),
            Self::Io(e) => format!("I/O failure: {e}"),
            Self::Json(e) => format!("Malformed JSON: {e}"),
            Self::Http(e) => format!("HTTP request failed: {e}"),
            Self::Config(msg) => format!("Invalid configuration: {msg}"),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Llm(_) => ErrorCategory::Llm,
            Self::Http(_) => ErrorCategory::Network,
            Self::Io(_) => ErrorCategory::Other,
            Self::Json(_) => ErrorCategory::Data,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::RateLimited);
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let llm_err = Error::Llm(LlmError::Unavailable);
        assert_eq!(llm_err.category(), ErrorCategory::Llm);
    }

    #[test]
    fn test_is_recoverable() {
        let fetch_err = Error::Fetch(FetchError::RateLimited);
        assert!(fetch_err.is_recoverable());

        let payload_err = Error::Fetch(FetchError::InvalidPayload("bad rows".into()));
        assert!(!payload_err.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let llm_err = LlmError::EmptyResponse;
        let unified: Error = llm_err.into();
        assert!(matches!(unified, Error::Llm(_)));
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("Invalid API key");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_category_describe() {
        assert_eq!(ErrorCategory::Network.describe(), "network error");
        assert_eq!(ErrorCategory::Config.describe(), "configuration error");
    }
}
