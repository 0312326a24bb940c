//! Time Series Model
//! Samples and series shared by the feed processor and the chart builders.

use chrono::{DateTime, TimeZone, Utc};

/// A single reading. `time` is seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        epoch_to_date(self.time)
    }
}

/// Convert epoch seconds to a UTC date.
///
/// Dates are always interpreted in UTC so a timestamp renders to the same
/// calendar day on every host.
pub fn epoch_to_date(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos).single()
}

/// Format epoch seconds with a strftime pattern, empty when out of range.
pub fn format_epoch(seconds: f64, pattern: &str) -> String {
    epoch_to_date(seconds)
        .map(|date| date.format(pattern).to_string())
        .unwrap_or_default()
}

/// One tracked quantity (a "whip"): ordered samples, strictly increasing by time.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: String,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            samples: Vec::new(),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// Every series decoded from one feed, plus the time extent of all rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    pub series: Vec<Series>,
    pub extent: Option<(f64, f64)>,
}

impl SeriesSet {
    pub fn is_empty(&self) -> bool {
        self.extent.is_none()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.series
            .iter()
            .filter_map(Series::max_value)
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }
}
