//! Text-completion boundary error types.

use thiserror::Error;

use crate::error::{ErrorCategory, TrendlensErrorTrait};

/// Errors raised by a text-completion backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// No credential or model configured, or backend construction failed.
    #[error("no text-completion backend configured")]
    Unavailable,

    /// The completion call itself failed.
    #[error("completion request failed: {0}")]
    RequestFailed(String),

    /// The backend answered without any generated text.
    #[error("backend returned an empty response")]
    EmptyResponse,
}

impl TrendlensErrorTrait for LlmError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    fn user_message(&self) -> String {
        match self {
            Self::Unavailable => "No explanation backend configured.".to_string(),
            Self::RequestFailed(reason) => format!("Explanation generation failed: {reason}"),
            Self::EmptyResponse => "The explanation backend returned no text.".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_request_failures_are_recoverable() {
        assert!(LlmError::RequestFailed("timeout".into()).is_recoverable());
        assert!(!LlmError::Unavailable.is_recoverable());
        assert!(!LlmError::EmptyResponse.is_recoverable());
    }
}
