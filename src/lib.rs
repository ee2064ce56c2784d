//! trendlens - Keyword search-interest explorer
//!
//! Fetches one year of weekly search-interest data for a keyword, flags
//! week-over-week anomalies, and requests short natural-language hypotheses
//! for the flagged weeks from a text-completion backend.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`trends`] - Series fetching, normalization, and the session cache
//! - [`anomaly`] - Week-over-week anomaly annotation
//! - [`llm`] - Explanation prompts and text-completion backends
//! - [`models`] - Core data structures and types
//! - [`report`] - Terminal presentation of annotated series
//! - [`cache`] - Process-lifetime session memo maps
//!
//! # Example
//!
//! ```no_run
//! use trendlens::anomaly::annotate;
//! use trendlens::config::Config;
//! use trendlens::trends::TrendsFetcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let fetcher = TrendsFetcher::new(config.trends.clone())?;
//!     let outcome = fetcher.fetch("electric cars").await;
//!     let annotated = annotate(&outcome.series, config.anomaly.change_threshold);
//!     println!("{} weeks, {} anomalous", annotated.len(),
//!         annotated.iter().filter(|p| p.is_anomaly).count());
//!     Ok(())
//! }
//! ```

pub mod anomaly;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod report;
pub mod trends;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::anomaly::{annotate, DEFAULT_CHANGE_THRESHOLD};
    pub use crate::config::{Config, DateRange};
    pub use crate::error::{Error, ErrorCategory, Result, TrendlensErrorTrait};
    pub use crate::llm::{Explainer, Explanation, ExplanationSource};
    pub use crate::models::{AnnotatedPoint, ChangeDirection, ObservationPoint, Series};
    pub use crate::trends::{FetchOutcome, FetchStatus, TrendsFetcher, TrendsQuery};
}

// Direct re-exports for convenience
pub use models::{AnnotatedPoint, ChangeDirection, ObservationPoint, Series};
