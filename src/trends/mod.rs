//! Series fetching: upstream query, courtesy delay, normalization, and the
//! per-session result cache.
//!
//! The fetcher never returns an error to its caller. Every failure collapses
//! into an empty [`Series`] plus a [`FetchStatus`] carrying the user-facing
//! condition, so the interaction flow cannot dead-end on upstream trouble.

pub mod error;
pub mod source;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveDate};
use rand::Rng;

pub use error::FetchError;
pub use source::{HttpTrendsSource, RawInterestRow, RawInterestTable, TrendsQuery, TrendsSource};

use crate::cache::SessionCache;
use crate::config::TrendsConfig;
use crate::models::{ObservationPoint, Series};

/// Outcome condition of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// Fresh data from the upstream source.
    Fresh,
    /// Replayed from the session cache.
    Cached,
    /// Valid call, no data for the keyword. A normal outcome.
    NoData,
    /// Upstream signalled a rate limit; series is empty.
    RateLimited,
    /// Any other upstream failure; series is empty.
    Failed(String),
}

impl FetchStatus {
    /// User-facing message for degraded outcomes; `None` when data arrived.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Fresh | Self::Cached => None,
            Self::NoData => Some("No trend data found. Try another keyword.".to_string()),
            Self::RateLimited => Some(
                "Rate limit exceeded. Please wait a few minutes before trying again.".to_string(),
            ),
            Self::Failed(reason) => Some(format!("Error fetching trends data: {reason}")),
        }
    }
}

/// Series plus the condition it arrived under.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub series: Series,
    pub status: FetchStatus,
}

impl FetchOutcome {
    fn degraded(status: FetchStatus) -> Self {
        Self {
            series: Series::empty(),
            status,
        }
    }
}

/// Weekly series fetcher over an injectable [`TrendsSource`].
pub struct TrendsFetcher {
    source: Arc<dyn TrendsSource>,
    cache: Arc<SessionCache<TrendsQuery, Series>>,
    config: TrendsConfig,
}

impl TrendsFetcher {
    /// Production fetcher speaking HTTP to the configured endpoint.
    pub fn new(config: TrendsConfig) -> crate::error::Result<Self> {
        let source = Arc::new(HttpTrendsSource::new(&config)?);
        Ok(Self::with_source(source, config))
    }

    /// Fetcher over an explicit source, with a fresh session cache.
    pub fn with_source(source: Arc<dyn TrendsSource>, config: TrendsConfig) -> Self {
        Self::with_source_and_cache(source, Arc::new(SessionCache::new()), config)
    }

    /// Fetcher over an explicit source and a shared session cache.
    pub fn with_source_and_cache(
        source: Arc<dyn TrendsSource>,
        cache: Arc<SessionCache<TrendsQuery, Series>>,
        config: TrendsConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    /// The full query tuple for a keyword under the configured timeframe and
    /// region; also the session cache key.
    pub fn query_for(&self, keyword: &str) -> TrendsQuery {
        TrendsQuery {
            keyword: keyword.to_string(),
            timeframe: self.config.timeframe,
            region: self.config.region.clone(),
        }
    }

    /// Fetch the weekly series for `keyword`. Safe to call repeatedly with
    /// identical arguments: successful results are replayed from the session
    /// cache without touching the upstream again.
    pub async fn fetch(&self, keyword: &str) -> FetchOutcome {
        let query = self.query_for(keyword);

        if let Some(series) = self.cache.get(&query) {
            tracing::debug!(keyword = %keyword, "session cache hit");
            let status = if series.is_empty() {
                FetchStatus::NoData
            } else {
                FetchStatus::Cached
            };
            return FetchOutcome { series, status };
        }

        self.courtesy_delay().await;

        tracing::info!(
            keyword = %keyword,
            timeframe = %query.timeframe,
            region = %query.region,
            "querying trends source"
        );

        let table = match self.source.interest_over_time(&query).await {
            Ok(table) => table,
            Err(e) if e.is_rate_limit() => {
                tracing::warn!(keyword = %keyword, "upstream rate limit");
                return FetchOutcome::degraded(FetchStatus::RateLimited);
            }
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "fetch failed");
                return FetchOutcome::degraded(FetchStatus::Failed(e.to_string()));
            }
        };

        let series = match normalize(&table, keyword) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "normalization failed");
                return FetchOutcome::degraded(FetchStatus::Failed(e.to_string()));
            }
        };

        // Empty results are cached too: re-querying a keyword with no data
        // would only re-spend the courtesy delay. Failures are never cached.
        self.cache.insert(query, series.clone());

        let status = if series.is_empty() {
            FetchStatus::NoData
        } else {
            FetchStatus::Fresh
        };
        FetchOutcome { series, status }
    }

    /// Single uniform random delay before the upstream call, to reduce the
    /// chance of upstream rate-limiting. Runs at most once per fetch; not a
    /// retry loop.
    async fn courtesy_delay(&self) {
        let (min, max) = (self.config.delay_min_secs, self.config.delay_max_secs);
        if max <= 0.0 {
            return;
        }
        let secs = rand::thread_rng().gen_range(min..=max);
        tracing::debug!(delay_secs = secs, "courtesy delay");
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}

/// Re-sample a raw interest table onto a strict weekly cadence.
///
/// Selects the requested keyword's column, drops the incompleteness marker,
/// strips timezone information, snaps each date to the week-ending Sunday,
/// and sorts ascending (last write wins on a collision).
fn normalize(table: &RawInterestTable, keyword: &str) -> Result<Series, FetchError> {
    let mut points = Vec::with_capacity(table.timeline.len());

    for row in &table.timeline {
        let value = *row.values.get(keyword).ok_or_else(|| {
            FetchError::InvalidPayload(format!("keyword column '{keyword}' missing"))
        })?;
        let date = parse_naive_date(&row.date)?;
        points.push(ObservationPoint::new(snap_to_week_end(date), value));
    }

    Ok(Series::from_points(points))
}

/// Parse a date label as a naive calendar date, stripping any timezone.
fn parse_naive_date(label: &str) -> Result<NaiveDate, FetchError> {
    if let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(label) {
        return Ok(datetime.date_naive());
    }
    Err(FetchError::InvalidPayload(format!(
        "unparseable date label '{label}'"
    )))
}

/// Snap a date forward to the Sunday ending its week (a Sunday stays put).
fn snap_to_week_end(date: NaiveDate) -> NaiveDate {
    let days_ahead = (7 - date.weekday().num_days_from_sunday()) % 7;
    date + Days::new(u64::from(days_ahead))
}
