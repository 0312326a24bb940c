//! Scale & Layout Module
//! Maps time and value domains onto plot pixels and generates axis ticks.

/// Space around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Outer canvas size and margins of one chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub outer_width: f64,
    pub outer_height: f64,
    pub margin: Margin,
}

impl ChartLayout {
    pub fn inner_width(&self) -> f64 {
        self.outer_width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.outer_height - self.margin.top - self.margin.bottom
    }
}

/// Upper bound of the shared y-domain.
///
/// A non-zero threshold widens the domain so its reference line stays on the
/// chart. An empty or all-zero chart falls back to `1.0` so the scale stays
/// invertible.
pub fn y_domain_max(series_max: Option<f64>, threshold: f64) -> f64 {
    let max = series_max.filter(|m| m.is_finite()).unwrap_or(0.0);
    let widened = if threshold != 0.0 && threshold.is_finite() {
        max.max(threshold)
    } else {
        max
    };
    if widened > 0.0 {
        widened
    } else {
        1.0
    }
}

fn interpolate(value: f64, domain: (f64, f64), range: (f64, f64)) -> f64 {
    let (d0, d1) = domain;
    let (r0, r1) = range;
    if d1 == d0 {
        return (r0 + r1) / 2.0;
    }
    r0 + (value - d0) / (d1 - d0) * (r1 - r0)
}

/// Epoch seconds to horizontal pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (f64, f64),
    range: (f64, f64),
}

/// Tick intervals in seconds, smallest first.
const TIME_INTERVALS: [f64; 18] = [
    1.0,
    5.0,
    15.0,
    30.0,
    60.0,
    5.0 * 60.0,
    15.0 * 60.0,
    30.0 * 60.0,
    3600.0,
    3.0 * 3600.0,
    6.0 * 3600.0,
    12.0 * 3600.0,
    86_400.0,
    2.0 * 86_400.0,
    7.0 * 86_400.0,
    30.0 * 86_400.0,
    90.0 * 86_400.0,
    365.0 * 86_400.0,
];

impl TimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, time: f64) -> f64 {
        interpolate(time, self.domain, self.range)
    }

    pub fn invert(&self, px: f64) -> f64 {
        interpolate(px, self.range, self.domain)
    }

    /// Interval used for roughly `count` ticks across the domain.
    pub fn tick_interval(&self, count: usize) -> f64 {
        let span = (self.domain.1 - self.domain.0).abs();
        let count = count.max(1) as f64;
        TIME_INTERVALS
            .iter()
            .copied()
            .find(|step| span / step <= count)
            .unwrap_or_else(|| {
                let year = TIME_INTERVALS[TIME_INTERVALS.len() - 1];
                year * (span / (year * count)).ceil()
            })
    }

    /// Tick positions aligned to UTC multiples of the chosen interval.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        if !start.is_finite() || !stop.is_finite() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }

        let step = self.tick_interval(count);
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Values to vertical pixels. Invertible, so hover positions map back to data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        interpolate(value, self.domain, self.range)
    }

    pub fn invert(&self, px: f64) -> f64 {
        interpolate(px, self.range, self.domain)
    }

    /// Step between ticks, a 1, 2 or 5 multiple of a power of ten.
    pub fn tick_step(&self, count: usize) -> f64 {
        let span = (self.domain.1 - self.domain.0).abs();
        let raw = span / count.max(1) as f64;
        if !(raw > 0.0) || !raw.is_finite() {
            return 0.0;
        }
        let mut step = 10f64.powf(raw.log10().floor());
        let error = raw / step;
        if error >= 50f64.sqrt() {
            step *= 10.0;
        } else if error >= 10f64.sqrt() {
            step *= 5.0;
        } else if error >= 2f64.sqrt() {
            step *= 2.0;
        }
        step
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        let step = self.tick_step(count);
        if step == 0.0 {
            return vec![start];
        }
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }

    /// Tick label with just enough decimals for the step.
    pub fn tick_label(value: f64, step: f64) -> String {
        let decimals = if step > 0.0 && step < 1.0 {
            (-step.log10().floor()) as usize
        } else {
            0
        };
        format!("{:.*}", decimals, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_domain_widens_to_threshold() {
        assert_eq!(y_domain_max(Some(42.0), 50.0), 50.0);
        assert_eq!(y_domain_max(Some(42.0), 0.0), 42.0);
        assert_eq!(y_domain_max(Some(60.0), 50.0), 60.0);
    }

    #[test]
    fn test_y_domain_degenerate_falls_back() {
        assert_eq!(y_domain_max(None, 0.0), 1.0);
        assert_eq!(y_domain_max(Some(0.0), 0.0), 1.0);
        assert_eq!(y_domain_max(None, 25.0), 25.0);
    }

    #[test]
    fn test_layout_inner_size() {
        let layout = ChartLayout {
            outer_width: 1100.0,
            outer_height: 400.0,
            margin: Margin::new(20.0, 250.0, 50.0, 80.0),
        };
        assert_eq!(layout.inner_width(), 770.0);
        assert_eq!(layout.inner_height(), 330.0);
    }

    #[test]
    fn test_linear_scale_round_trip() {
        let y = LinearScale::new((0.0, 50.0), (330.0, 0.0));
        assert_eq!(y.map(0.0), 330.0);
        assert_eq!(y.map(50.0), 0.0);
        assert!((y.invert(y.map(17.25)) - 17.25).abs() < 1e-9);
    }

    #[test]
    fn test_time_scale_degenerate_domain_maps_to_middle() {
        let x = TimeScale::new((100.0, 100.0), (0.0, 770.0));
        assert_eq!(x.map(100.0), 385.0);
        assert_eq!(x.ticks(10), vec![100.0]);
    }

    #[test]
    fn test_linear_ticks() {
        let y = LinearScale::new((0.0, 42.0), (330.0, 0.0));
        assert_eq!(y.tick_step(10), 5.0);
        assert_eq!(
            y.ticks(10),
            vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0]
        );
        assert_eq!(LinearScale::tick_label(0.5, 0.1), "0.5");
        assert_eq!(LinearScale::tick_label(35.0, 5.0), "35");
    }

    #[test]
    fn test_time_ticks_align_to_interval() {
        // Six hours of data -> hourly ticks on the hour
        let start = 1_700_000_000.0;
        let x = TimeScale::new((start, start + 6.0 * 3600.0), (0.0, 770.0));
        assert_eq!(x.tick_interval(10), 3600.0);
        let ticks = x.ticks(10);
        assert_eq!(ticks.len(), 6);
        assert!(ticks.iter().all(|t| t % 3600.0 == 0.0));
        assert!(ticks[0] >= start);
    }
}
