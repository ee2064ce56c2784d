// Core data structures for trendlens

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One weekly search-interest sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ObservationPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered weekly series for one (keyword, timeframe, region) query.
///
/// Points are strictly ascending by date, one per week. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<ObservationPoint>,
}

impl Series {
    /// Empty series. The normal "no data" value, not an error.
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Build from arbitrary points: sorts ascending by date and dedupes,
    /// keeping the last point for a repeated date.
    pub fn from_points(mut points: Vec<ObservationPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<ObservationPoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }
        Self { points: deduped }
    }

    pub fn points(&self) -> &[ObservationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservationPoint> {
        self.points.iter()
    }
}

impl FromIterator<ObservationPoint> for Series {
    fn from_iter<I: IntoIterator<Item = ObservationPoint>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

/// Direction of a week-over-week change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Spiked,
    Dropped,
    None,
}

impl ChangeDirection {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spiked => "spiked",
            Self::Dropped => "dropped",
            Self::None => "none",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spiked" | "spike" | "up" => Some(Self::Spiked),
            "dropped" | "drop" | "down" => Some(Self::Dropped),
            "none" => Some(Self::None),
            _ => None,
        }
    }

}

impl std::fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An observation annotated with its week-over-week classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Signed fraction vs. the previous week. `None` for the first point or
    /// when the previous value is zero.
    pub relative_change: Option<f64>,
    pub is_anomaly: bool,
    pub direction: ChangeDirection,
}

impl AnnotatedPoint {
    /// Project back to the underlying observation.
    pub fn observation(&self) -> ObservationPoint {
        ObservationPoint {
            date: self.date,
            value: self.value,
        }
    }

    /// Week-over-week change as a signed percentage with one decimal,
    /// or an em-dash when undefined.
    pub fn formatted_change(&self) -> String {
        format_signed_pct(self.relative_change)
    }
}

/// `+35.0%` / `-33.3%` style formatting; em-dash for undefined.
pub fn format_signed_pct(change: Option<f64>) -> String {
    match change {
        Some(x) => format!("{:+.1}%", x * 100.0),
        None => "—".to_string(),
    }
}
