//! Bitmap Export
//! PNG rendering of chart models through the plotters bitmap backend.
//!
//! Layout comes from the same models the SVG writer uses; plotters only
//! rasterizes. Text needs a system sans-serif font.

use crate::charts::curve::Point;
use crate::charts::hover::{HoverState, MARKER_RADIUS};
use crate::charts::line_chart::LineChartModel;
use crate::charts::model::RenderError;
use crate::charts::palette::{self, Rgb};
use crate::charts::panel_chart::{Anchor, PanelChartModel, COLUMN_HEADERS, MARGIN};
use crate::charts::style::{heading_font, subheading_font, HEADING_ROW, LEGEND_BOX};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const FONT_FAMILY: &str = "sans-serif";
const TICK_SIZE: f64 = 6.0;

fn backend_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Backend(err.to_string())
}

pub(crate) fn to_rgb_color(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Pixel coordinate for a point offset by `origin`.
pub(crate) fn pixel(origin: (f64, f64), x: f64, y: f64) -> (i32, i32) {
    ((origin.0 + x).round() as i32, (origin.1 + y).round() as i32)
}

/// A drawing area with the plot origin applied to every coordinate.
struct Canvas<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    origin: (f64, f64),
}

impl<DB: DrawingBackend> Canvas<DB> {
    fn polyline(&self, points: &[Point], color: Rgb, width: u32) -> Result<(), RenderError> {
        let coords: Vec<(i32, i32)> = points
            .iter()
            .map(|p| pixel(self.origin, p.x, p.y))
            .collect();
        self.area
            .draw(&PathElement::new(coords, to_rgb_color(color).stroke_width(width)))
            .map_err(backend_error)
    }

    fn line(&self, from: (f64, f64), to: (f64, f64), color: Rgb) -> Result<(), RenderError> {
        self.polyline(&[Point::new(from.0, from.1), Point::new(to.0, to.1)], color, 1)
    }

    fn rect(&self, x: f64, y: f64, width: f64, height: f64, color: Rgb) -> Result<(), RenderError> {
        let corners = [
            pixel(self.origin, x, y),
            pixel(self.origin, x + width, y + height),
        ];
        self.area
            .draw(&Rectangle::new(corners, to_rgb_color(color).filled()))
            .map_err(backend_error)
    }

    fn circle(&self, center: Point, radius: f64, color: Rgb) -> Result<(), RenderError> {
        self.area
            .draw(&Circle::new(
                pixel(self.origin, center.x, center.y),
                radius.round() as i32,
                to_rgb_color(color).stroke_width(1),
            ))
            .map_err(backend_error)
    }

    fn text(&self, text: &str, at: (f64, f64), style: TextStyle<'_>) -> Result<(), RenderError> {
        if text.is_empty() {
            return Ok(());
        }
        self.area
            .draw(&Text::new(text.to_string(), pixel(self.origin, at.0, at.1), style))
            .map_err(backend_error)
    }

    fn present(self) -> Result<(), RenderError> {
        self.area.present().map_err(backend_error)
    }
}

fn text_style(size: f64, color: Rgb, pos: Pos) -> TextStyle<'static> {
    (FONT_FAMILY, size).into_font().color(&to_rgb_color(color)).pos(pos)
}

pub fn render_line_chart_png(
    model: &LineChartModel,
    hover: Option<&HoverState>,
    path: &Path,
) -> Result<(), RenderError> {
    let layout = model.style.layout;
    let root = BitMapBackend::new(path, (layout.outer_width as u32, layout.outer_height as u32))
        .into_drawing_area();
    draw_line_chart(root, model, hover)
}

fn draw_line_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    model: &LineChartModel,
    hover: Option<&HoverState>,
) -> Result<(), RenderError> {
    let layout = model.style.layout;
    let (width, height) = (model.inner_width(), model.inner_height());
    root.fill(&WHITE).map_err(backend_error)?;
    let canvas = Canvas {
        area: root,
        origin: (layout.margin.left, layout.margin.top),
    };

    // Axes
    let black = palette::BLACK;
    canvas.line((0.0, 0.0), (0.0, height), black)?;
    canvas.line((0.0, height), (width, height), black)?;
    let below = text_style(10.0, black, Pos::new(HPos::Right, VPos::Top));
    for tick in model.x_ticks() {
        canvas.line((tick.position, height), (tick.position, height + TICK_SIZE), black)?;
        canvas.text(&tick.label, (tick.position, height + TICK_SIZE + 3.0), below.clone())?;
    }
    let left = text_style(10.0, black, Pos::new(HPos::Right, VPos::Center));
    for tick in model.y_ticks() {
        canvas.line((-TICK_SIZE, tick.position), (0.0, tick.position), black)?;
        canvas.text(&tick.label, (-(TICK_SIZE + 3.0), tick.position), left.clone())?;
    }
    let y_label = (FONT_FAMILY, 10.0)
        .into_font()
        .transform(FontTransform::Rotate270)
        .color(&to_rgb_color(black))
        .pos(Pos::new(HPos::Right, VPos::Top));
    canvas.text(&model.text.y_label, (TICK_SIZE, 0.0), y_label)?;

    for line in &model.reference_lines {
        let y = model.y.map(line.value);
        canvas.line((0.0, y), (width, y), line.color)?;
        canvas.text(
            line.label,
            (width + 5.0, y),
            text_style(10.0, black, Pos::new(HPos::Left, VPos::Center)),
        )?;
    }

    let heading_x = width + 2.0 * LEGEND_BOX;
    let (size, color) = heading_font();
    canvas.text(
        &model.text.heading,
        (heading_x, HEADING_ROW + model.heading_offset()),
        text_style(size, color, Pos::new(HPos::Left, VPos::Bottom)),
    )?;
    for (i, row, text) in model.heading_rows() {
        let (size, color) = subheading_font(i);
        canvas.text(
            text,
            (heading_x, row),
            text_style(size, color, Pos::new(HPos::Left, VPos::Bottom)),
        )?;
    }

    for (i, series) in model.series.iter().enumerate() {
        let top = model.legend_row(i);
        canvas.rect(model.legend_x(), top, LEGEND_BOX, LEGEND_BOX, series.color)?;
        canvas.text(
            &series.id,
            (model.legend_text_x(), top + LEGEND_BOX),
            text_style(10.0, black, Pos::new(HPos::Left, VPos::Bottom)),
        )?;
    }

    // Hidden series are skipped rather than drawn transparent
    for series in &model.series {
        if model.opacity(&series.key) > 0.0 && !series.path.is_empty() {
            canvas.polyline(series.path.polyline(), series.color, 2)?;
        }
    }

    if let Some(hover) = hover.filter(|h| model.hover_enabled && h.visible) {
        if let Some(x) = hover.guideline_x {
            canvas.line((x, height), (x, 0.0), palette::MOUSE_LINE)?;
        }
        for marker in &hover.markers {
            let Some(series) = model.series.iter().find(|s| s.key == marker.key) else {
                continue;
            };
            canvas.circle(marker.point, MARKER_RADIUS, series.color)?;
            canvas.text(
                &marker.label(),
                (marker.point.x + 10.0, marker.point.y + 3.0),
                text_style(10.0, black, Pos::new(HPos::Left, VPos::Bottom)),
            )?;
        }
    }

    canvas.present()
}

pub fn render_panel_chart_png(model: &PanelChartModel, path: &Path) -> Result<(), RenderError> {
    let root = BitMapBackend::new(
        path,
        (model.outer_width() as u32, model.outer_height() as u32),
    )
    .into_drawing_area();
    draw_panel_chart(root, model)
}

fn draw_panel_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    model: &PanelChartModel,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(backend_error)?;

    let headers = Canvas {
        area: root,
        origin: (MARGIN.left, MARGIN.top),
    };
    for (x, text, anchor) in COLUMN_HEADERS {
        let hpos = match anchor {
            Anchor::Start => HPos::Left,
            Anchor::Middle => HPos::Center,
        };
        headers.text(text, (x, 0.0), text_style(15.0, palette::BLACK, Pos::new(hpos, VPos::Bottom)))?;
    }

    let graph = Canvas {
        area: headers.area,
        origin: model.graph_origin(),
    };
    for label in &model.labels {
        graph.text(
            &label.text,
            (label.x, label.y),
            text_style(label.size, label.color, Pos::new(HPos::Left, VPos::Bottom)),
        )?;
    }
    for bar in model.phase_bars.iter().chain(&model.breaker_markers) {
        graph.rect(bar.x, bar.y, bar.width, bar.height, bar.fill)?;
    }

    graph.present()
}
