//! Line Chart Module
//! Lays out one time-series chart and serializes it to SVG.

use crate::charts::curve::{num, PathGeometry, Point};
use crate::charts::hover::{HoverState, MARKER_RADIUS};
use crate::charts::legend::{LegendState, ELEMENT_ID_PREFIX};
use crate::charts::model::RenderError;
use crate::charts::palette::{OrdinalColors, Rgb, BLACK, COMMIT_LINE, MAX_LINE, MOUSE_LINE};
use crate::charts::scale::{y_domain_max, LinearScale, TimeScale};
use crate::charts::style::{
    heading_font, subheading_font, ChartKind, ChartStyle, ChartText, HEADING_ROW, LEGEND_BOX,
    THRESHOLD_HEADING_OFFSET,
};
use crate::charts::svg::{self, Element};
use crate::data::{format_epoch, Sample, SeriesSet};
use crate::stats::{SeriesStats, StatsCalculator};

/// Target tick count on both axes.
pub const TICK_COUNT: usize = 10;
const TICK_SIZE: f64 = 6.0;
/// Gap between the plot's right edge and a reference line label.
const REFERENCE_LABEL_GAP: f64 = 5.0;

const STYLESHEET: &str = "\
.line { fill: none; stroke-width: 1.5px; }
.whip { transition: opacity 1s; }
.legend rect { cursor: pointer; }
";

/// A series placed on the chart.
#[derive(Debug, Clone)]
pub struct PlottedSeries {
    pub id: String,
    pub key: String,
    pub color: Rgb,
    pub samples: Vec<Sample>,
    pub path: PathGeometry,
    pub stats: SeriesStats,
}

/// Horizontal guide spanning the plot width.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub label: &'static str,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Pixel offset along the axis.
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct LineChartModel {
    pub kind: ChartKind,
    pub style: ChartStyle,
    pub text: ChartText,
    pub x: TimeScale,
    pub y: LinearScale,
    pub series: Vec<PlottedSeries>,
    pub legend: LegendState,
    pub reference_lines: Vec<ReferenceLine>,
    /// Hover tracking is only wired when the chart is the sole one on a page.
    pub hover_enabled: bool,
}

impl LineChartModel {
    /// Build the chart for `kind` from a validated feed.
    ///
    /// `threshold` is ignored by kinds without a threshold line; zero means
    /// no threshold.
    pub fn build(
        kind: ChartKind,
        text: ChartText,
        threshold: f64,
        solo: bool,
        set: &SeriesSet,
    ) -> Result<Self, RenderError> {
        let style = kind.line_style().ok_or(RenderError::NotALineChart(kind))?;
        let extent = match set.extent {
            Some(extent) if !set.is_empty() => extent,
            _ => return Err(RenderError::EmptyChart),
        };

        let threshold = match style.threshold_label {
            Some(_) if threshold.is_finite() => threshold,
            _ => 0.0,
        };

        let stats = StatsCalculator::compute_all_stats_parallel(set);
        let series_max = StatsCalculator::overall_max(&stats);

        let layout = style.layout;
        let x = TimeScale::new(extent, (0.0, layout.inner_width()));
        let y = LinearScale::new(
            (0.0, y_domain_max(series_max, threshold)),
            (layout.inner_height(), 0.0),
        );

        let legend = LegendState::new(set.series.iter().map(|s| s.id.as_str()));
        let mut colors = OrdinalColors::category10();
        let series = set
            .series
            .iter()
            .zip(stats)
            .zip(legend.entries())
            .map(|((source, stats), entry)| {
                let points: Vec<Point> = source
                    .samples
                    .iter()
                    .map(|s| Point::new(x.map(s.time), y.map(s.value)))
                    .collect();
                PlottedSeries {
                    id: source.id.clone(),
                    key: entry.key.clone(),
                    color: colors.color(&source.id),
                    samples: source.samples.clone(),
                    path: PathGeometry::basis(&points),
                    stats,
                }
            })
            .collect();

        let mut reference_lines = Vec::new();
        if let (Some(label), true) = (style.threshold_label, threshold != 0.0) {
            if style.max_line {
                if let Some(max) = series_max {
                    reference_lines.push(ReferenceLine {
                        label: "Max kW",
                        value: max,
                        color: MAX_LINE,
                    });
                }
            }
            reference_lines.push(ReferenceLine {
                label,
                value: threshold,
                color: COMMIT_LINE,
            });
        }

        Ok(Self {
            kind,
            style,
            text,
            x,
            y,
            series,
            legend,
            reference_lines,
            hover_enabled: style.hover && solo,
        })
    }

    pub fn inner_width(&self) -> f64 {
        self.style.layout.inner_width()
    }

    pub fn inner_height(&self) -> f64 {
        self.style.layout.inner_height()
    }

    /// Vertical shift applied to the headings.
    pub fn heading_offset(&self) -> f64 {
        if self.reference_lines.is_empty() {
            0.0
        } else {
            THRESHOLD_HEADING_OFFSET
        }
    }

    /// Index, baseline and text of each sub-heading that has a row.
    pub fn heading_rows(&self) -> impl Iterator<Item = (usize, f64, &str)> + '_ {
        let offset = self.heading_offset();
        self.text
            .subheadings
            .iter()
            .zip(self.style.subheading_rows)
            .enumerate()
            .map(move |(i, (text, row))| (i, row + offset, text.as_str()))
    }

    pub fn x_ticks(&self) -> Vec<Tick> {
        self.x
            .ticks(TICK_COUNT)
            .into_iter()
            .map(|t| Tick {
                position: self.x.map(t),
                label: format_epoch(t, self.style.tick_format),
            })
            .collect()
    }

    pub fn y_ticks(&self) -> Vec<Tick> {
        let step = self.y.tick_step(TICK_COUNT);
        self.y
            .ticks(TICK_COUNT)
            .into_iter()
            .map(|v| Tick {
                position: self.y.map(v),
                label: LinearScale::tick_label(v, step),
            })
            .collect()
    }

    /// Top of the `index`-th legend swatch; entries stack upward from the
    /// bottom of the plot.
    pub fn legend_row(&self, index: usize) -> f64 {
        let layout = self.style.layout;
        layout.outer_height
            - layout.margin.bottom
            - layout.margin.top
            - LEGEND_BOX
            - 2.0 * LEGEND_BOX * index as f64
    }

    pub fn legend_x(&self) -> f64 {
        self.inner_width() + 2.0 * LEGEND_BOX
    }

    pub fn legend_text_x(&self) -> f64 {
        self.inner_width() + 4.0 * LEGEND_BOX
    }

    /// Legend key under a plot-local position, if any.
    pub fn legend_hit(&self, x: f64, y: f64) -> Option<&str> {
        let right = self.inner_width() + self.style.layout.margin.right;
        if x < self.legend_x() || x > right {
            return None;
        }
        self.legend
            .entries()
            .iter()
            .enumerate()
            .find(|(i, _)| {
                let top = self.legend_row(*i);
                y >= top && y <= top + LEGEND_BOX
            })
            .map(|(_, entry)| entry.key.as_str())
    }

    pub fn opacity(&self, key: &str) -> f64 {
        self.legend.entry(key).map_or(0.0, |e| e.opacity())
    }

    /// Serialize the chart. `hover` is drawn only when tracking is enabled.
    pub fn to_svg(&self, hover: Option<&HoverState>) -> String {
        let layout = self.style.layout;
        let margin = layout.margin;

        let mut root = svg::svg_root(layout.outer_width, layout.outer_height)
            .child(Element::new("style").text(STYLESHEET));

        let mut plot = Element::new("g").attr("transform", svg::translate(margin.left, margin.top));
        plot.push(self.x_axis());
        plot.push(self.y_axis());

        for line in &self.reference_lines {
            let y = num(self.y.map(line.value));
            plot.push(
                Element::new("line")
                    .attr("class", "reference")
                    .attr("x1", 0)
                    .attr("x2", num(self.inner_width()))
                    .attr("y1", &y)
                    .attr("y2", &y)
                    .attr("style", format!("stroke-width: 1; stroke: {}", line.color)),
            );
            plot.push(
                Element::new("text")
                    .attr("x", num(self.inner_width() + REFERENCE_LABEL_GAP))
                    .attr("y", &y)
                    .attr("dy", "0.32em")
                    .attr("style", "font: 10px sans-serif")
                    .text(line.label),
            );
        }

        let heading_x = num(self.inner_width() + 2.0 * LEGEND_BOX);
        if !self.text.heading.is_empty() {
            let (size, color) = heading_font();
            plot.push(
                Element::new("text")
                    .attr("class", "heading")
                    .attr("x", &heading_x)
                    .attr("y", num(HEADING_ROW + self.heading_offset()))
                    .attr("style", format!("font: {size}px sans-serif; fill: {color}"))
                    .text(self.text.heading.as_str()),
            );
        }
        for (i, row, text) in self.heading_rows() {
            let (size, color) = subheading_font(i);
            plot.push(
                Element::new("text")
                    .attr("class", "subheading")
                    .attr("x", &heading_x)
                    .attr("y", num(row))
                    .attr("style", format!("font: {size}px sans-serif; fill: {color}"))
                    .text(text),
            );
        }

        for (i, entry) in self.legend.entries().iter().enumerate() {
            let color = self.series[i].color;
            let top = self.legend_row(i);
            let mut swatch = Element::new("rect")
                .attr("x", num(self.legend_x()))
                .attr("y", num(top))
                .attr("width", LEGEND_BOX)
                .attr("height", LEGEND_BOX)
                .attr("style", format!("fill: {color}"));
            if self.style.toggle {
                swatch = swatch.attr("data-series", entry.element_id());
            }
            plot.push(
                Element::new("g")
                    .attr("class", "legend")
                    .child(swatch)
                    .child(
                        Element::new("text")
                            .attr("x", num(self.legend_text_x()))
                            .attr("y", num(top + LEGEND_BOX))
                            .attr("style", "font: 10px sans-serif")
                            .text(entry.id.as_str()),
                    ),
            );
        }

        for series in &self.series {
            plot.push(
                Element::new("g")
                    .attr("class", "whip")
                    .attr("id", format!("{ELEMENT_ID_PREFIX}{}", series.key))
                    .attr("opacity", num(self.opacity(&series.key)))
                    .child(
                        Element::new("path")
                            .attr("class", "line")
                            .attr("d", series.path.svg_data())
                            .attr("style", format!("stroke: {}", series.color)),
                    ),
            );
        }

        root.push(plot);
        if self.hover_enabled {
            root.push(self.mouse_layer(hover));
        }
        svg::document(&root)
    }

    fn x_axis(&self) -> Element {
        let width = num(self.inner_width() + 0.5);
        let mut axis = Element::new("g")
            .attr("class", "axis axis--x")
            .attr("transform", svg::translate(0.0, self.inner_height()))
            .attr("fill", "none")
            .attr("font-size", 10)
            .attr("font-family", "sans-serif")
            .child(
                Element::new("path")
                    .attr("class", "domain")
                    .attr("stroke", BLACK)
                    .attr("d", format!("M0.5,{TICK_SIZE}V0.5H{width}V{TICK_SIZE}")),
            );
        for tick in self.x_ticks() {
            axis.push(
                Element::new("g")
                    .attr("class", "tick")
                    .attr("transform", svg::translate(tick.position, 0.0))
                    .child(Element::new("line").attr("stroke", BLACK).attr("y2", TICK_SIZE))
                    .child(
                        Element::new("text")
                            .attr("fill", BLACK)
                            .attr("y", TICK_SIZE + 3.0)
                            .attr("dx", "-.8em")
                            .attr("dy", ".15em")
                            .attr("transform", "rotate(-20)")
                            .attr("text-anchor", "end")
                            .text(tick.label),
                    ),
            );
        }
        axis
    }

    fn y_axis(&self) -> Element {
        let height = num(self.inner_height() + 0.5);
        let mut axis = Element::new("g")
            .attr("class", "axis axis--y")
            .attr("fill", "none")
            .attr("font-size", 10)
            .attr("font-family", "sans-serif")
            .attr("text-anchor", "end")
            .child(
                Element::new("path")
                    .attr("class", "domain")
                    .attr("stroke", BLACK)
                    .attr("d", format!("M-{TICK_SIZE},{height}H0.5V0.5H-{TICK_SIZE}")),
            );
        for tick in self.y_ticks() {
            axis.push(
                Element::new("g")
                    .attr("class", "tick")
                    .attr("transform", svg::translate(0.0, tick.position))
                    .child(Element::new("line").attr("stroke", BLACK).attr("x2", -TICK_SIZE))
                    .child(
                        Element::new("text")
                            .attr("fill", BLACK)
                            .attr("x", -(TICK_SIZE + 3.0))
                            .attr("dy", "0.32em")
                            .text(tick.label),
                    ),
            );
        }
        axis.push(
            Element::new("text")
                .attr("transform", "rotate(-90)")
                .attr("y", TICK_SIZE)
                .attr("dy", "0.71em")
                .attr("fill", BLACK)
                .text(self.text.y_label.as_str()),
        );
        axis
    }

    /// Guideline, per-series markers and the pointer capture rect.
    fn mouse_layer(&self, hover: Option<&HoverState>) -> Element {
        let margin = self.style.layout.margin;
        let visible = hover.map_or(false, |h| h.visible);
        let opacity = if visible { "1" } else { "0" };

        let mut guideline = Element::new("path")
            .attr("class", "mouse-line")
            .attr("style", format!("stroke: {MOUSE_LINE}; stroke-width: 1px"))
            .attr("opacity", opacity);
        if let Some(x) = hover.and_then(|h| h.guideline_x) {
            let x = num(x);
            guideline = guideline.attr(
                "d",
                format!("M{x},{} {x},{}", num(self.inner_height()), 0),
            );
        }

        let mut layer = Element::new("g")
            .attr("class", "mouse-over-effects")
            .attr("transform", svg::translate(margin.left, margin.top))
            .child(guideline);

        for series in &self.series {
            let mut group = Element::new("g")
                .attr("class", "mouse-per-line")
                .attr("data-series", series.key.as_str());
            let mut label = Element::new("text")
                .attr("transform", svg::translate(10.0, 3.0))
                .attr("opacity", opacity);
            if let Some(marker) = hover.and_then(|h| h.marker(&series.key)) {
                group = group.attr("transform", svg::translate(marker.point.x, marker.point.y));
                label = label.text(marker.label());
            }
            layer.push(
                group
                    .child(
                        Element::new("circle")
                            .attr("r", MARKER_RADIUS)
                            .attr(
                                "style",
                                format!("stroke: {}; fill: none; stroke-width: 1px", series.color),
                            )
                            .attr("opacity", opacity),
                    )
                    .child(label),
            );
        }

        layer.child(
            Element::new("rect")
                .attr("width", num(self.inner_width()))
                .attr("height", num(self.inner_height()))
                .attr("fill", "none")
                .attr("pointer-events", "all"),
        )
    }
}
