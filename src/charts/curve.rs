//! Curve Geometry Module
//! Builds the smoothed series paths and answers arc-length queries on them.

use std::fmt::Write;

/// A point in plot-local pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
}

/// Line segments used to approximate each cubic segment.
const CUBIC_STEPS: usize = 16;

/// A rendered series path: drawing commands plus a flattened polyline with
/// cumulative lengths for arc-length lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGeometry {
    commands: Vec<PathCommand>,
    polyline: Vec<Point>,
    lengths: Vec<f64>,
}

impl PathGeometry {
    /// Uniform cubic B-spline through the control points.
    ///
    /// The curve starts at the first point, ends at the last and passes near
    /// the ones between. When the points increase in x, so does the curve.
    pub fn basis(points: &[Point]) -> Self {
        let mut commands = Vec::new();
        match points {
            [] => {}
            [only] => commands.push(PathCommand::MoveTo(*only)),
            [first, second] => {
                commands.push(PathCommand::MoveTo(*first));
                commands.push(PathCommand::LineTo(*second));
            }
            [first, second, rest @ ..] => {
                commands.push(PathCommand::MoveTo(*first));
                commands.push(PathCommand::LineTo(Point::new(
                    (5.0 * first.x + second.x) / 6.0,
                    (5.0 * first.y + second.y) / 6.0,
                )));

                let (mut a, mut b) = (*first, *second);
                for &c in rest {
                    commands.push(Self::basis_segment(a, b, c));
                    a = b;
                    b = c;
                }
                commands.push(Self::basis_segment(a, b, b));
                commands.push(PathCommand::LineTo(b));
            }
        }
        Self::from_commands(commands)
    }

    fn basis_segment(a: Point, b: Point, c: Point) -> PathCommand {
        PathCommand::CubicTo(
            Point::new((2.0 * a.x + b.x) / 3.0, (2.0 * a.y + b.y) / 3.0),
            Point::new((a.x + 2.0 * b.x) / 3.0, (a.y + 2.0 * b.y) / 3.0),
            Point::new((a.x + 4.0 * b.x + c.x) / 6.0, (a.y + 4.0 * b.y + c.y) / 6.0),
        )
    }

    fn from_commands(commands: Vec<PathCommand>) -> Self {
        let mut polyline: Vec<Point> = Vec::new();
        for command in &commands {
            match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => polyline.push(p),
                PathCommand::CubicTo(c1, c2, end) => {
                    let Some(&start) = polyline.last() else {
                        polyline.push(end);
                        continue;
                    };
                    for step in 1..=CUBIC_STEPS {
                        let t = step as f64 / CUBIC_STEPS as f64;
                        polyline.push(cubic_point(start, c1, c2, end, t));
                    }
                }
            }
        }

        let mut lengths = Vec::with_capacity(polyline.len());
        let mut total = 0.0;
        for (i, p) in polyline.iter().enumerate() {
            if i > 0 {
                total += polyline[i - 1].distance(*p);
            }
            lengths.push(total);
        }

        Self {
            commands,
            polyline,
            lengths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polyline.is_empty()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Flattened points, as drawn by raster backends.
    pub fn polyline(&self) -> &[Point] {
        &self.polyline
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Option<Point> {
        self.polyline.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.polyline.last().copied()
    }

    /// Point reached after walking `length` pixels along the path, clamped
    /// to the path ends.
    pub fn point_at_length(&self, length: f64) -> Option<Point> {
        let start = self.start()?;
        // NaN lands here too
        if !(length > 0.0) || self.polyline.len() == 1 {
            return Some(start);
        }
        if length >= self.total_length() {
            return self.end();
        }

        // First vertex at or past `length`; never 0 because length > 0.
        let index = self.lengths.partition_point(|&l| l < length);
        let (l0, l1) = (self.lengths[index - 1], self.lengths[index]);
        let segment = l1 - l0;
        let t = if segment > 0.0 {
            (length - l0) / segment
        } else {
            0.0
        };
        Some(self.polyline[index - 1].lerp(self.polyline[index], t))
    }

    /// SVG `d` attribute for the path.
    pub fn svg_data(&self) -> String {
        let mut d = String::new();
        for command in &self.commands {
            // Writing to a String cannot fail
            let _ = match command {
                PathCommand::MoveTo(p) => write!(d, "M{},{}", num(p.x), num(p.y)),
                PathCommand::LineTo(p) => write!(d, "L{},{}", num(p.x), num(p.y)),
                PathCommand::CubicTo(c1, c2, p) => write!(
                    d,
                    "C{},{},{},{},{},{}",
                    num(c1.x),
                    num(c1.y),
                    num(c2.x),
                    num(c2.y),
                    num(p.x),
                    num(p.y)
                ),
            };
        }
        d
    }
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Compact number formatting for SVG output: at most 3 decimals, no
/// trailing zeros.
pub fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{:.3}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
