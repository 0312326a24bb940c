//! Statistics Calculator Module
//! Per-series summaries used for reference lines and legend tooltips.

use crate::data::{Series, SeriesSet};
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Summary statistics for a single series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub series_id: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p95: f64,
}

impl SeriesStats {
    fn empty(series_id: &str) -> Self {
        Self {
            series_id: series_id.to_string(),
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            p95: f64::NAN,
        }
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for one series, skipping NaN samples.
    pub fn compute_series_stats(series: &Series) -> SeriesStats {
        let values: Vec<f64> = series.values().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return SeriesStats::empty(&series.id);
        }

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        SeriesStats {
            series_id: series.id.clone(),
            count: values.len(),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            mean: Statistics::mean(values.iter()),
            p95: Self::percentile(&sorted, 95.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Compute statistics for every series in parallel, keeping feed order.
    pub fn compute_all_stats_parallel(set: &SeriesSet) -> Vec<SeriesStats> {
        set.series
            .par_iter()
            .map(Self::compute_series_stats)
            .collect()
    }

    /// Largest value across all summaries, if any series had data.
    pub fn overall_max(stats: &[SeriesStats]) -> Option<f64> {
        stats
            .iter()
            .filter(|s| s.count > 0)
            .map(|s| s.max)
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;

    fn series(id: &str, values: &[f64]) -> Series {
        Series {
            id: id.to_string(),
            samples: values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(i as f64, v))
                .collect(),
        }
    }

    #[test]
    fn test_compute_series_stats() {
        let stats = StatsCalculator::compute_series_stats(&series("a", &[4.0, 1.0, 3.0, 2.0]));
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.p95 - 3.85).abs() < 1e-12);
    }

    #[test]
    fn test_empty_series_stats() {
        let stats = StatsCalculator::compute_series_stats(&series("a", &[]));
        assert_eq!(stats.count, 0);
        assert!(stats.max.is_nan());
    }

    #[test]
    fn test_parallel_stats_keep_order_and_max() {
        let set = SeriesSet {
            series: vec![series("x", &[1.0, 42.0]), series("y", &[]), series("z", &[7.0])],
            extent: Some((0.0, 1.0)),
        };
        let stats = StatsCalculator::compute_all_stats_parallel(&set);
        let ids: Vec<&str> = stats.iter().map(|s| s.series_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(StatsCalculator::overall_max(&stats), Some(42.0));
    }
}
