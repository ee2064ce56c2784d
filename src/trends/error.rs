//! Fetch-boundary error types.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::error::{ErrorCategory, TrendlensErrorTrait};

/// Pattern for an HTTP-429-shaped signal buried in upstream error text.
fn rate_limit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b429\b|too\s*many\s*requests").expect("valid pattern"))
}

/// Errors raised by a trends data source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Upstream rejected the request with a rate-limit signal.
    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited,

    /// Upstream answered with a non-success status.
    #[error("upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// The request never completed (connect, timeout, DNS).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response arrived but could not be interpreted.
    #[error("malformed trends payload: {0}")]
    InvalidPayload(String),
}

impl FetchError {
    /// Whether this error carries an HTTP-429 indicator, either as the
    /// dedicated variant or buried in upstream error text.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Upstream { status, message } => {
                *status == 429 || rate_limit_pattern().is_match(message)
            }
            Self::Transport(message) => rate_limit_pattern().is_match(message),
            Self::InvalidPayload(_) => false,
        }
    }
}

impl TrendlensErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Upstream { status, .. } => *status >= 500,
            Self::Transport(_) => true,
            Self::InvalidPayload(_) => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::RateLimited => {
                "Rate limit exceeded. Please wait a few minutes before trying again.".to_string()
            }
            Self::Upstream { status, message } => {
                format!("Error fetching trends data (HTTP {status}): {message}")
            }
            Self::Transport(message) => format!("Error fetching trends data: {message}"),
            Self::InvalidPayload(message) => format!("Error reading trends data: {message}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPayload(_) => ErrorCategory::Data,
            _ => ErrorCategory::Network,
        }
    }
}
