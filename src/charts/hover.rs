//! Hover Tracker Module
//! Resolves the pointer position to the nearest point on every series path.

use crate::charts::curve::{PathGeometry, Point};
use crate::charts::line_chart::LineChartModel;

/// Marker circle radius.
pub const MARKER_RADIUS: f64 = 7.0;

/// Upper bound on probes; arc lengths are far below 2^64 pixels.
const MAX_PROBES: usize = 64;

/// Pointer activity over the plot area, in plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Entered,
    Moved { x: f64 },
    Left,
}

/// Find the point on `path` whose x is nearest `pointer_x`.
///
/// Binary search over arc length: probe the midpoint length, then keep the
/// half whose x range still contains the pointer. Probes are whole pixels of
/// arc length, so the result is within one pixel of the exact crossing.
/// Pointers beyond either end clamp to that end; a zero-length path is a
/// fixed point.
pub fn nearest_point(path: &PathGeometry, pointer_x: f64) -> Option<Point> {
    let start = path.start()?;
    let end = path.end()?;
    let total = path.total_length();

    if !(total > 0.0) || pointer_x <= start.x {
        return Some(start);
    }
    if pointer_x >= end.x {
        return Some(end);
    }

    let mut low = 0.0;
    let mut high = total;
    let mut probe = start;
    for _ in 0..MAX_PROBES {
        let target = ((low + high) / 2.0).floor();
        probe = path.point_at_length(target)?;
        if (target == high || target == low) && probe.x != pointer_x {
            break;
        }
        if probe.x > pointer_x {
            high = target;
        } else if probe.x < pointer_x {
            low = target;
        } else {
            break;
        }
    }

    // The first interval may be up to two pixels wide when the total length
    // is fractional; settle on whichever bound lands closer.
    let upper = path.point_at_length(high)?;
    if (upper.x - pointer_x).abs() < (probe.x - pointer_x).abs() {
        probe = upper;
    }
    Some(probe)
}

/// Per-series hover readout.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverMarker {
    pub key: String,
    pub point: Point,
    pub value: f64,
}

impl HoverMarker {
    pub fn label(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// On-screen hover state: the vertical guideline and one marker per series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    pub visible: bool,
    pub guideline_x: Option<f64>,
    pub markers: Vec<HoverMarker>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one pointer event. Cheap and idempotent per event.
    pub fn handle(&mut self, event: PointerEvent, chart: &LineChartModel) {
        match event {
            PointerEvent::Entered => self.visible = true,
            PointerEvent::Left => self.visible = false,
            PointerEvent::Moved { x } => {
                self.guideline_x = Some(x);
                self.markers = chart
                    .series
                    .iter()
                    .filter(|series| chart.legend.is_visible(&series.key))
                    .filter_map(|series| {
                        let point = nearest_point(&series.path, x)?;
                        Some(HoverMarker {
                            key: series.key.clone(),
                            point,
                            value: chart.y.invert(point.y),
                        })
                    })
                    .collect();
            }
        }
    }

    pub fn marker(&self, key: &str) -> Option<&HoverMarker> {
        self.markers.iter().find(|m| m.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::style::{ChartKind, ChartText};
    use crate::data::{Sample, Series, SeriesSet};

    fn zigzag(n: usize) -> PathGeometry {
        let points: Vec<Point> = (0..n)
            .map(|i| Point::new(i as f64 * 37.0, if i % 2 == 0 { 40.0 } else { 260.0 }))
            .collect();
        PathGeometry::basis(&points)
    }

    /// Exact nearest x on the flattened path, by brute force.
    fn brute_force_x(path: &PathGeometry, pointer_x: f64) -> f64 {
        path.polyline()
            .windows(2)
            .find_map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                (a.x <= pointer_x && pointer_x <= b.x).then_some(pointer_x)
            })
            .unwrap_or(f64::NAN)
    }

    #[test]
    fn test_nearest_point_within_one_pixel() {
        let path = zigzag(20);
        let (first, last) = (path.start().unwrap().x, path.end().unwrap().x);
        let mut x = first;
        while x <= last {
            let found = nearest_point(&path, x).unwrap();
            assert!(
                (found.x - brute_force_x(&path, x)).abs() <= 1.0,
                "pointer {x} resolved to {}",
                found.x
            );
            x += 3.7;
        }
    }

    #[test]
    fn test_pointer_outside_range_clamps() {
        let path = zigzag(5);
        assert_eq!(nearest_point(&path, -50.0), path.start());
        assert_eq!(nearest_point(&path, 10_000.0), path.end());
    }

    #[test]
    fn test_single_sample_is_fixed_point() {
        let path = PathGeometry::basis(&[Point::new(120.0, 33.0)]);
        for x in [-10.0, 0.0, 120.0, 500.0] {
            assert_eq!(nearest_point(&path, x), Some(Point::new(120.0, 33.0)));
        }
        assert_eq!(nearest_point(&PathGeometry::default(), 5.0), None);
    }

    fn chart() -> LineChartModel {
        let samples = |values: &[f64]| -> Vec<Sample> {
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Sample::new(i as f64 * 60.0, v))
                .collect()
        };
        let set = SeriesSet {
            series: vec![
                Series {
                    id: "Whip A".to_string(),
                    samples: samples(&[10.0, 10.0, 10.0]),
                },
                Series {
                    id: "Whip B".to_string(),
                    samples: samples(&[40.0]),
                },
            ],
            extent: Some((0.0, 120.0)),
        };
        LineChartModel::build(ChartKind::Cabinet, ChartText::default(), 0.0, true, &set).unwrap()
    }

    #[test]
    fn test_pointer_events_update_state() {
        let chart = chart();
        let mut hover = HoverState::new();

        hover.handle(PointerEvent::Entered, &chart);
        assert!(hover.visible);

        hover.handle(PointerEvent::Moved { x: 200.0 }, &chart);
        assert_eq!(hover.guideline_x, Some(200.0));
        assert_eq!(hover.markers.len(), 2);

        let flat = hover.marker("WhipA").unwrap();
        assert!((flat.value - 10.0).abs() < 1e-9);
        assert_eq!(flat.label(), "10.00");

        // One sample sits at the start of the time axis whatever the pointer
        let single = hover.marker("WhipB").unwrap();
        assert_eq!(single.point.x, 0.0);
        assert!((single.value - 40.0).abs() < 1e-9);

        hover.handle(PointerEvent::Left, &chart);
        assert!(!hover.visible);
        assert_eq!(hover.markers.len(), 2);
    }

    #[test]
    fn test_toggled_off_series_has_no_marker() {
        let mut chart = chart();
        chart.legend.toggle("WhipB");
        let mut hover = HoverState::new();

        hover.handle(PointerEvent::Entered, &chart);
        hover.handle(PointerEvent::Moved { x: 200.0 }, &chart);
        assert_eq!(hover.markers.len(), 1);
        assert!(hover.marker("WhipB").is_none());

        chart.legend.toggle("WhipB");
        hover.handle(PointerEvent::Moved { x: 200.0 }, &chart);
        assert_eq!(hover.markers.len(), 2);
    }
}
