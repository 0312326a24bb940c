//! Chart Viewer Widget
//! Paints a chart model with egui, tracks the pointer for hover markers and
//! toggles series from the legend.

use crate::charts::{
    heading_font, subheading_font, Anchor, ChartModel, HoverState, LineChartModel,
    PanelChartModel, PointerEvent, Rgb, COLUMN_HEADERS, HEADING_ROW, LEGEND_BOX, MARKER_RADIUS,
    MOUSE_LINE, PANEL_MARGIN,
};
use egui::epaint::TextShape;
use egui::{Align2, Color32, FontId, Id, Pos2, Rect, RichText, ScrollArea, Sense, Shape, Stroke, Vec2};

/// Seconds a toggled series takes to fade in or out.
const TOGGLE_FADE_SECS: f32 = 1.0;
const TICK_SIZE: f32 = 6.0;

fn color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

/// Maps plot-local coordinates onto the screen.
#[derive(Clone, Copy)]
struct PlotFrame {
    origin: Pos2,
}

impl PlotFrame {
    fn pos(&self, x: f64, y: f64) -> Pos2 {
        self.origin + Vec2::new(x as f32, y as f32)
    }

    fn local(&self, pos: Pos2) -> (f64, f64) {
        let v = pos - self.origin;
        (v.x as f64, v.y as f64)
    }
}

/// Central area: the selected chart, or a placeholder.
#[derive(Default)]
pub struct ChartViewer {
    model: Option<ChartModel>,
    hover: HoverState,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.model = None;
        self.hover = HoverState::new();
    }

    pub fn set_model(&mut self, model: ChartModel) {
        self.model = Some(model);
        self.hover = HoverState::new();
    }

    pub fn model(&self) -> Option<&ChartModel> {
        self.model.as_ref()
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(model) = self.model.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No chart selected").size(20.0));
            });
            return;
        };

        let hover = &mut self.hover;
        ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| match model {
                ChartModel::Line(line) => Self::draw_line_chart(ctx, ui, line, hover),
                ChartModel::Panel(panel) => Self::draw_panel_chart(ui, panel),
            });
    }

    fn draw_line_chart(
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        model: &mut LineChartModel,
        hover: &mut HoverState,
    ) {
        let layout = model.style.layout;
        let (response, painter) = ui.allocate_painter(
            Vec2::new(layout.outer_width as f32, layout.outer_height as f32),
            Sense::click(),
        );
        painter.rect_filled(response.rect, 0.0, Color32::WHITE);
        let frame = PlotFrame {
            origin: response.rect.min + Vec2::new(layout.margin.left as f32, layout.margin.top as f32),
        };
        let (width, height) = (model.inner_width(), model.inner_height());
        let plot_rect = Rect::from_min_max(frame.pos(0.0, 0.0), frame.pos(width, height));

        // Pointer events, resolved before painting so markers follow this frame
        if model.hover_enabled {
            match response.hover_pos().filter(|p| plot_rect.contains(*p)) {
                Some(pos) => {
                    if !hover.visible {
                        hover.handle(PointerEvent::Entered, model);
                    }
                    let (x, _) = frame.local(pos);
                    hover.handle(PointerEvent::Moved { x }, model);
                }
                None if hover.visible => hover.handle(PointerEvent::Left, model),
                None => {}
            }
        }
        if model.style.toggle && response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = frame.local(pos);
                if let Some(key) = model.legend_hit(x, y).map(str::to_string) {
                    model.legend.toggle(&key);
                }
            }
        }

        let black = Stroke::new(1.0, Color32::BLACK);
        let tick_font = FontId::proportional(10.0);

        painter.line_segment([frame.pos(0.0, 0.0), frame.pos(0.0, height)], black);
        painter.line_segment([frame.pos(0.0, height), frame.pos(width, height)], black);
        for tick in model.x_ticks() {
            let base = frame.pos(tick.position, height);
            painter.line_segment([base, base + Vec2::new(0.0, TICK_SIZE)], black);
            // Rotated -20 degrees so the end of the label sits under the tick
            let angle = -20f32.to_radians();
            let galley = painter.layout_no_wrap(tick.label, tick_font.clone(), Color32::BLACK);
            let w = galley.size().x;
            let anchor = base + Vec2::new(-w * angle.cos(), TICK_SIZE + 3.0 - w * angle.sin());
            painter.add(TextShape::new(anchor, galley, Color32::BLACK).with_angle(angle));
        }
        for tick in model.y_ticks() {
            let base = frame.pos(0.0, tick.position);
            painter.line_segment([base - Vec2::new(TICK_SIZE, 0.0), base], black);
            painter.text(
                base - Vec2::new(TICK_SIZE + 3.0, 0.0),
                Align2::RIGHT_CENTER,
                tick.label,
                tick_font.clone(),
                Color32::BLACK,
            );
        }
        let y_label = painter.layout_no_wrap(model.text.y_label.clone(), tick_font.clone(), Color32::BLACK);
        let y_label_pos = frame.pos(TICK_SIZE as f64, y_label.size().x as f64);
        painter.add(
            TextShape::new(y_label_pos, y_label, Color32::BLACK)
                .with_angle(-std::f32::consts::FRAC_PI_2),
        );

        for line in &model.reference_lines {
            let y = model.y.map(line.value);
            painter.line_segment(
                [frame.pos(0.0, y), frame.pos(width, y)],
                Stroke::new(1.0, color32(line.color)),
            );
            painter.text(
                frame.pos(width + 5.0, y),
                Align2::LEFT_CENTER,
                line.label,
                tick_font.clone(),
                Color32::BLACK,
            );
        }

        let heading_x = width + 2.0 * LEGEND_BOX;
        let (size, color) = heading_font();
        painter.text(
            frame.pos(heading_x, HEADING_ROW + model.heading_offset()),
            Align2::LEFT_BOTTOM,
            &model.text.heading,
            FontId::proportional(size as f32),
            color32(color),
        );
        for (i, row, text) in model.heading_rows() {
            let (size, color) = subheading_font(i);
            painter.text(
                frame.pos(heading_x, row),
                Align2::LEFT_BOTTOM,
                text,
                FontId::proportional(size as f32),
                color32(color),
            );
        }

        for (i, series) in model.series.iter().enumerate() {
            let top = model.legend_row(i);
            let swatch = Rect::from_min_size(
                frame.pos(model.legend_x(), top),
                Vec2::splat(LEGEND_BOX as f32),
            );
            painter.rect_filled(swatch, 0.0, color32(series.color));
            painter.text(
                frame.pos(model.legend_text_x(), top + LEGEND_BOX),
                Align2::LEFT_BOTTOM,
                &series.id,
                tick_font.clone(),
                Color32::BLACK,
            );
        }

        for series in &model.series {
            let opacity = ctx.animate_bool_with_time(
                Id::new(("whip", series.key.as_str())),
                model.legend.is_visible(&series.key),
                TOGGLE_FADE_SECS,
            );
            if opacity <= 0.0 || series.path.is_empty() {
                continue;
            }
            let points: Vec<Pos2> = series
                .path
                .polyline()
                .iter()
                .map(|p| frame.pos(p.x, p.y))
                .collect();
            painter.add(Shape::line(
                points,
                Stroke::new(1.5, color32(series.color).gamma_multiply(opacity)),
            ));
        }

        if model.hover_enabled && hover.visible {
            if let Some(x) = hover.guideline_x {
                painter.line_segment(
                    [frame.pos(x, height), frame.pos(x, 0.0)],
                    Stroke::new(1.0, color32(MOUSE_LINE)),
                );
            }
            for marker in &hover.markers {
                let Some(series) = model.series.iter().find(|s| s.key == marker.key) else {
                    continue;
                };
                let center = frame.pos(marker.point.x, marker.point.y);
                painter.circle_stroke(center, MARKER_RADIUS as f32, Stroke::new(1.0, color32(series.color)));
                painter.text(
                    center + Vec2::new(10.0, 3.0),
                    Align2::LEFT_BOTTOM,
                    marker.label(),
                    tick_font.clone(),
                    Color32::BLACK,
                );
            }
        }

        // Legend tooltip with the series summary
        let summary = response.hover_pos().and_then(|pos| {
            let (x, y) = frame.local(pos);
            let key = model.legend_hit(x, y)?;
            let stats = &model.series.iter().find(|s| s.key == key)?.stats;
            (stats.count > 0).then(|| {
                format!(
                    "{}\nmin {:.2}  mean {:.2}  max {:.2}\np95 {:.2}  ({} samples)",
                    stats.series_id, stats.min, stats.mean, stats.max, stats.p95, stats.count
                )
            })
        });
        if let Some(summary) = summary {
            response.on_hover_text_at_pointer(summary);
        }
    }

    fn draw_panel_chart(ui: &mut egui::Ui, model: &PanelChartModel) {
        let (response, painter) = ui.allocate_painter(
            Vec2::new(model.outer_width() as f32, model.outer_height() as f32),
            Sense::hover(),
        );
        painter.rect_filled(response.rect, 0.0, Color32::WHITE);

        let header = PlotFrame {
            origin: response.rect.min
                + Vec2::new(PANEL_MARGIN.left as f32, PANEL_MARGIN.top as f32),
        };
        for (x, text, anchor) in COLUMN_HEADERS {
            let align = match anchor {
                Anchor::Start => Align2::LEFT_BOTTOM,
                Anchor::Middle => Align2::CENTER_BOTTOM,
            };
            painter.text(header.pos(x, 0.0), align, text, FontId::proportional(15.0), Color32::BLACK);
        }

        let (left, top) = model.graph_origin();
        let graph = PlotFrame {
            origin: response.rect.min + Vec2::new(left as f32, top as f32),
        };
        for label in &model.labels {
            painter.text(
                graph.pos(label.x, label.y),
                Align2::LEFT_BOTTOM,
                &label.text,
                FontId::proportional(label.size as f32),
                color32(label.color),
            );
        }
        for bar in model.phase_bars.iter().chain(&model.breaker_markers) {
            let rect = Rect::from_min_size(
                graph.pos(bar.x, bar.y),
                Vec2::new(bar.width as f32, bar.height as f32),
            );
            painter.rect_filled(rect, 0.0, color32(bar.fill));
        }

        if let Some(pos) = response.hover_pos() {
            let (x, y) = graph.local(pos);
            if let Some(bar) = model.bar_at(x, y) {
                let title = bar.title.clone();
                response.on_hover_text_at_pointer(title);
            }
        }
    }
}
