//! Common test utilities

use chrono::NaiveDate;
use serde_json::{json, Value};
use trendlens::config::TrendsConfig;
use trendlens::models::{ObservationPoint, Series};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Weekly series anchored on Sunday 2023-01-01, one value per week.
#[allow(dead_code)]
pub fn weekly_series(values: &[f64]) -> Series {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            ObservationPoint::new(date("2023-01-01") + chrono::Days::new(7 * i as u64), v)
        })
        .collect()
}

/// Raw upstream payload: one row per (date label, value, is_partial).
#[allow(dead_code)]
pub fn timeline_json(keyword: &str, rows: &[(&str, f64, bool)]) -> Value {
    json!({
        "timeline": rows
            .iter()
            .map(|(d, v, partial)| {
                json!({ "date": d, "values": { keyword: v }, "is_partial": partial })
            })
            .collect::<Vec<_>>(),
    })
}

/// Trends config pointed at a test server, with the courtesy delay zeroed.
#[allow(dead_code)]
pub fn test_trends_config(base_url: &str) -> TrendsConfig {
    TrendsConfig {
        base_url: base_url.to_string(),
        delay_min_secs: 0.0,
        delay_max_secs: 0.0,
        timeout_secs: 5,
        ..TrendsConfig::default()
    }
}
