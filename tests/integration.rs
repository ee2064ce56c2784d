//! End-to-end pipeline tests
//!
//! Drives fetch, annotate, report, and explain over an in-memory trends
//! source, including the fetch-contract cases for HTTP-status-shaped
//! errors.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::{date, test_trends_config, timeline_json};
use trendlens::anomaly::annotate;
use trendlens::config::{LlmConfig, LlmProvider};
use trendlens::llm::{Explainer, ExplanationSource};
use trendlens::report;
use trendlens::trends::{
    FetchError, FetchStatus, RawInterestTable, TrendsFetcher, TrendsQuery, TrendsSource,
};

/// In-memory trends source returning a fixed result.
struct FakeSource {
    result: Result<RawInterestTable, FetchError>,
    calls: AtomicUsize,
}

impl FakeSource {
    fn new(result: Result<RawInterestTable, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    fn table(value: serde_json::Value) -> Arc<Self> {
        Self::new(Ok(serde_json::from_value(value).unwrap()))
    }
}

#[async_trait]
impl TrendsSource for FakeSource {
    async fn interest_over_time(
        &self,
        _query: &TrendsQuery,
    ) -> Result<RawInterestTable, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn fetcher_over(source: Arc<FakeSource>) -> TrendsFetcher {
    TrendsFetcher::with_source(source, test_trends_config("http://unused.invalid"))
}

/// A 429-shaped error yields RateLimited plus an empty series
#[tokio::test]
async fn test_status_shaped_rate_limit() {
    let source = FakeSource::new(Err(FetchError::Upstream {
        status: 429,
        message: "slow down".to_string(),
    }));
    let outcome = fetcher_over(source).fetch("rust").await;

    assert_eq!(outcome.status, FetchStatus::RateLimited);
    assert!(outcome.series.is_empty());
}

/// A 429 indicator buried in error text is still a rate limit
#[tokio::test]
async fn test_text_shaped_rate_limit() {
    let source = FakeSource::new(Err(FetchError::Transport(
        "upstream replied: TooManyRequests".to_string(),
    )));
    let outcome = fetcher_over(source).fetch("rust").await;

    assert_eq!(outcome.status, FetchStatus::RateLimited);
}

/// Any other error is a generic failure carrying the error text
#[tokio::test]
async fn test_other_errors_are_generic_failures() {
    let source = FakeSource::new(Err(FetchError::Upstream {
        status: 500,
        message: "database on fire".to_string(),
    }));
    let outcome = fetcher_over(source).fetch("rust").await;

    assert!(outcome.series.is_empty());
    match outcome.status {
        FetchStatus::Failed(reason) => assert!(reason.contains("database on fire")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

/// Identical fetches hit the source once
#[tokio::test]
async fn test_memoized_fetch_hits_source_once() {
    let source = FakeSource::table(timeline_json("rust", &[("2023-01-01", 50.0, false)]));
    let fetcher = fetcher_over(Arc::clone(&source));

    assert_eq!(fetcher.fetch("rust").await.status, FetchStatus::Fresh);
    assert_eq!(fetcher.fetch("rust").await.status, FetchStatus::Cached);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

/// Full pipeline: fetch, annotate, render, explain (fallback path)
#[tokio::test]
async fn test_pipeline_end_to_end() {
    let source = FakeSource::table(timeline_json(
        "electric cars",
        &[
            // Deliberately out of order, one timezone-carrying label.
            ("2023-01-15", 90.0, false),
            ("2023-01-01", 100.0, false),
            ("2023-01-08T00:00:00+00:00", 135.0, false),
            ("2023-01-22", 90.0, false),
            ("2023-01-29", 0.0, false),
            ("2023-02-05", 50.0, true),
        ],
    ));
    let fetcher = fetcher_over(source);

    let outcome = fetcher.fetch("electric cars").await;
    assert_eq!(outcome.status, FetchStatus::Fresh);
    assert_eq!(outcome.series.len(), 6);

    let annotated = annotate(&outcome.series, 0.30);
    assert_eq!(annotated.len(), 6);

    let flagged: Vec<_> = annotated.iter().filter(|p| p.is_anomaly).collect();
    assert_eq!(flagged.len(), 3);
    assert_eq!(flagged[0].date, date("2023-01-08"));

    // One row per week plus the header.
    let table = report::render_table(&annotated);
    assert_eq!(table.lines().count(), 7);

    let summary = report::render_anomaly_summary(&annotated, 0.30);
    assert!(summary.contains("2023-01-08 • spiked • WoW: +35.0%"));
    assert!(summary.contains("2023-01-15 • dropped • WoW: -33.3%"));
    assert!(summary.contains("2023-01-29 • dropped • WoW: -100.0%"));

    // No credential configured: canned fallback, embedding the anomaly.
    let llm = LlmConfig {
        provider: LlmProvider::OpenAi,
        ..LlmConfig::default()
    };
    let explainer = Explainer::new(llm, "US".to_string(), None);
    let explanation = explainer
        .explain("electric cars", flagged[0].date, flagged[0].direction)
        .await;
    assert_eq!(explanation.source, ExplanationSource::Fallback);
    assert!(explanation.text.contains("electric cars"));
    assert!(explanation.text.contains("2023-01-08"));
    assert!(explanation.text.contains("spiked"));
}

/// A shared injected cache serves a second fetcher without a source call
#[tokio::test]
async fn test_shared_cache_across_fetchers() {
    use trendlens::cache::SessionCache;

    let cache = Arc::new(SessionCache::new());
    let source = FakeSource::table(timeline_json("rust", &[("2023-01-01", 50.0, false)]));

    let first_fetcher = TrendsFetcher::with_source_and_cache(
        Arc::clone(&source) as Arc<dyn TrendsSource>,
        Arc::clone(&cache),
        test_trends_config("http://unused.invalid"),
    );
    assert_eq!(first_fetcher.fetch("rust").await.status, FetchStatus::Fresh);

    let second_fetcher = TrendsFetcher::with_source_and_cache(
        Arc::clone(&source) as Arc<dyn TrendsSource>,
        cache,
        test_trends_config("http://unused.invalid"),
    );
    assert_eq!(second_fetcher.fetch("rust").await.status, FetchStatus::Cached);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

/// Distinct keywords fetch independently over a shared fetcher
#[tokio::test]
async fn test_concurrent_fetches_across_keywords() {
    let source = FakeSource::table(timeline_json("k", &[("2023-01-01", 10.0, false)]));
    let fetcher = Arc::new(fetcher_over(source));

    let mut handles = Vec::new();
    for i in 0..4 {
        let fetcher = Arc::clone(&fetcher);
        handles.push(tokio::spawn(async move {
            fetcher.fetch(&format!("keyword-{i}")).await
        }));
    }

    for handle in handles {
        let outcome = handle.await.unwrap();
        // The fake always answers with column "k", so normalization reports
        // a failure; the point is that nothing panics or cross-talks.
        assert!(matches!(outcome.status, FetchStatus::Failed(_)));
    }
}
