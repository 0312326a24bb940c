//! Stats module - series summaries

mod calculator;

pub use calculator::{SeriesStats, StatsCalculator};
