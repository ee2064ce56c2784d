//! External trends data source boundary.
//!
//! [`TrendsSource`] is the collaborator seam: one query in, one raw
//! per-date interest table (or an HTTP-status-shaped error) out.
//! [`HttpTrendsSource`] is the production implementation; tests substitute
//! a mock server or an in-memory fake.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::FetchError;
use crate::config::{DateRange, TrendsConfig};

/// Exact input tuple of one trends query; also the session cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendsQuery {
    pub keyword: String,
    pub timeframe: DateRange,
    pub region: String,
}

/// One raw sample row: a date label, one value column per requested
/// keyword, and the incompleteness marker for a still-open period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInterestRow {
    pub date: String,
    pub values: HashMap<String, f64>,
    #[serde(default)]
    pub is_partial: bool,
}

/// Raw per-date numeric table returned by the upstream source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInterestTable {
    pub timeline: Vec<RawInterestRow>,
}

/// Query interface of the external trends data source.
#[async_trait]
pub trait TrendsSource: Send + Sync {
    async fn interest_over_time(
        &self,
        query: &TrendsQuery,
    ) -> Result<RawInterestTable, FetchError>;
}

/// HTTP implementation of [`TrendsSource`].
pub struct HttpTrendsSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTrendsSource {
    pub fn new(config: &TrendsConfig) -> crate::error::Result<Self> {
        Self::with_base_url(&config.base_url, config.timeout_secs)
    }

    /// Construct against an explicit base URL (tests point this at a mock
    /// server).
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> crate::error::Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/interest_over_time",
            base_url.trim_end_matches('/')
        ))
        .map_err(|e| crate::error::Error::config(format!("invalid trends base URL: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("trendlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl TrendsSource for HttpTrendsSource {
    async fn interest_over_time(
        &self,
        query: &TrendsQuery,
    ) -> Result<RawInterestTable, FetchError> {
        let start = query.timeframe.start.to_string();
        let end = query.timeframe.end.to_string();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("keyword", query.keyword.as_str()),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("region", query.region.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            let message = truncate(&response.text().await.unwrap_or_default(), 200);
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<RawInterestTable>()
            .await
            .map_err(|e| FetchError::InvalidPayload(e.to_string()))
    }
}

fn truncate(s: &str, max: usize) -> String {
    let mut out: String = s.chars().take(max).collect();
    if s.chars().count() > max {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_construction() {
        let source = HttpTrendsSource::with_base_url("http://localhost:9000/", 5).unwrap();
        assert_eq!(
            source.endpoint.as_str(),
            "http://localhost:9000/interest_over_time"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(HttpTrendsSource::with_base_url("not a url", 5).is_err());
    }

    #[test]
    fn test_row_partial_flag_defaults_false() {
        let row: RawInterestRow = serde_json::from_str(
            r#"{"date": "2023-01-01", "values": {"rust": 42.0}}"#,
        )
        .unwrap();
        assert!(!row.is_partial);
    }
}
