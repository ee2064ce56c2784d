//! Terminal presentation of an annotated series.
//!
//! Renders the weekly table, the anomaly summary, and the user-facing
//! status messages. Pure string construction so the exact output is
//! testable; the binary only prints what this module returns.

use crate::anomaly::anomalies;
use crate::config::{region_display_name, Config};
use crate::models::AnnotatedPoint;

/// Aligned weekly table: date, interest value, week-over-week change, and an
/// anomaly marker with direction.
pub fn render_table(annotated: &[AnnotatedPoint]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>8} {:>9}  {}\n",
        "week", "interest", "WoW", "anomaly"
    ));

    for point in annotated {
        let marker = if point.is_anomaly {
            match point.direction.as_str() {
                "spiked" => "▲ spiked",
                "dropped" => "▼ dropped",
                other => other,
            }
        } else {
            ""
        };
        out.push_str(&format!(
            "{:<12} {:>8.0} {:>9}  {}\n",
            point.date.to_string(),
            point.value,
            point.formatted_change(),
            marker
        ));
    }

    out
}

/// One-line heading for a flagged week: `2023-06-11 • spiked • WoW: +35.0%`.
pub fn anomaly_heading(point: &AnnotatedPoint) -> String {
    format!(
        "{} • {} • WoW: {}",
        point.date,
        point.direction,
        point.formatted_change()
    )
}

/// Summary block listing every flagged week, or the no-anomalies notice.
pub fn render_anomaly_summary(annotated: &[AnnotatedPoint], threshold: f64) -> String {
    let anomalies = anomalies(annotated);

    let mut out = String::from("Anomalies\n");
    if anomalies.is_empty() {
        out.push_str(&format!(
            "No anomalies detected (±{:.0}% WoW).\n",
            threshold * 100.0
        ));
    } else {
        for point in anomalies {
            out.push_str(&format!("  {}\n", anomaly_heading(point)));
        }
    }
    out
}

/// Query parameters caption: time period and region.
pub fn render_caption(config: &Config) -> String {
    format!(
        "Time period: {} — {} • Region: {}",
        config.trends.timeframe.start,
        config.trends.timeframe.end,
        region_display_name(&config.trends.region)
    )
}
