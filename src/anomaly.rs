//! Week-over-week anomaly annotation.
//!
//! A single linear pass over a weekly series: each point's relative change
//! against the previous week is computed, and points whose absolute change
//! meets the threshold are flagged with a direction. Intentionally a simple,
//! auditable rule rather than a statistical model.

use crate::models::{AnnotatedPoint, ChangeDirection, Series};

/// Default anomaly threshold: a ±30% week-over-week change.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.30;

/// Annotate a series with week-over-week relative changes and anomaly flags.
///
/// The relative change of point `i` is `(value[i] - value[i-1]) / value[i-1]`,
/// undefined for the first point and whenever the previous value is zero. A
/// point is anomalous when its change is defined and `|change| >= threshold`
/// (the exact-threshold tie is flagged). A change from a zero prior value is
/// undefined rather than an infinite spike.
///
/// Deterministic and idempotent; output length always equals input length,
/// and an empty series yields an empty annotation.
pub fn annotate(series: &Series, threshold: f64) -> Vec<AnnotatedPoint> {
    let mut annotated = Vec::with_capacity(series.len());
    let mut previous: Option<f64> = None;

    for point in series.iter() {
        let relative_change = match previous {
            Some(prev) if prev != 0.0 => Some((point.value - prev) / prev),
            _ => None,
        };

        let is_anomaly = relative_change.is_some_and(|rc| rc.abs() >= threshold);

        let direction = match relative_change {
            Some(rc) if rc > 0.0 => ChangeDirection::Spiked,
            Some(rc) if rc < 0.0 => ChangeDirection::Dropped,
            _ => ChangeDirection::None,
        };

        annotated.push(AnnotatedPoint {
            date: point.date,
            value: point.value,
            relative_change,
            is_anomaly,
            direction,
        });
        previous = Some(point.value);
    }

    annotated
}

/// The anomalous subset of an annotation, in series order.
pub fn anomalies(annotated: &[AnnotatedPoint]) -> Vec<&AnnotatedPoint> {
    annotated.iter().filter(|p| p.is_anomaly).collect()
}
