//! Panel Failover Chart Module
//! One horizontal bar per phase, grouped by device and panel, scaled against
//! the phase breaker rating.

use crate::charts::curve::num;
use crate::charts::palette::{OrdinalColors, Rgb, BLACK, BREAKER_PALETTE};
use crate::charts::scale::{LinearScale, Margin};
use crate::charts::style::ChartText;
use crate::charts::svg::{self, Element};
use crate::data::{DeviceGroup, Phase};

pub const PHASE_WIDTH: f64 = 900.0;
pub const PHASE_HEIGHT: f64 = 5.0;
pub const PHASE_PADDING: f64 = 1.0;
pub const PANEL_WIDTH: f64 = 15.0;
pub const PANEL_PADDING: f64 = 2.0;
pub const PANEL_HEIGHT: f64 = 3.0 * (PHASE_HEIGHT + PHASE_PADDING) + PANEL_PADDING;
pub const DEVICE_WIDTH: f64 = 120.0;
pub const DEVICE_PADDING: f64 = 10.0;
pub const TOP_LABEL_BOX: f64 = 20.0;
pub const MARGIN: Margin = Margin::new(20.0, 50.0, 20.0, 50.0);
const BREAKER_MARKER_WIDTH: f64 = 2.0;
const HEADER_FONT_SIZE: f64 = 15.0;
const DEVICE_FONT_SIZE: f64 = 12.0;
const PANEL_FONT_SIZE: f64 = 10.0;

/// Blue channel of the bar fill, per phase.
const PHASE_BLUE: [u8; 3] = [0, 63, 127];

/// Bar fill for a phase with `headroom` percent left on its breaker.
///
/// Green down to 30%, ramping through yellow to red at 10%.
pub fn headroom_color(headroom: f64, phase: Phase) -> Rgb {
    let ramp = |h: f64| ((h - 10.0) * 255.0 / 10.0).clamp(0.0, 255.0).round() as u8;
    let (red, green) = if headroom < 10.0 {
        (255, 0)
    } else if headroom < 20.0 {
        (255, ramp(headroom))
    } else if headroom < 30.0 {
        (ramp(headroom - 10.0), 255)
    } else {
        (0, 255)
    };
    Rgb(red, green, PHASE_BLUE[phase.index()])
}

/// A filled rect with a tooltip, in graph-area coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Rgb,
    pub title: String,
}

impl Bar {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: Rgb,
    pub size: f64,
}

/// Horizontal alignment of a column header around its x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
}

impl Anchor {
    fn svg_value(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
        }
    }
}

/// Column headers above the graph area.
pub const COLUMN_HEADERS: [(f64, &str, Anchor); 4] = [
    (0.0, "Device", Anchor::Start),
    (DEVICE_WIDTH, "Panel", Anchor::Middle),
    (DEVICE_WIDTH + PANEL_WIDTH + PHASE_WIDTH / 2.0, "Amps", Anchor::Middle),
    (DEVICE_WIDTH + PANEL_WIDTH + PHASE_WIDTH, "Breaker", Anchor::Middle),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PanelChartModel {
    pub text: ChartText,
    pub inner_width: f64,
    pub inner_height: f64,
    pub labels: Vec<Label>,
    pub phase_bars: Vec<Bar>,
    pub breaker_markers: Vec<Bar>,
}

impl PanelChartModel {
    /// Lay out devices top to bottom in the order given.
    pub fn build(text: ChartText, groups: &[DeviceGroup]) -> Self {
        let mut colors = OrdinalColors::category10();
        let mut breaker_colors = OrdinalColors::new(&BREAKER_PALETTE);
        let mut labels = Vec::new();
        let mut phase_bars = Vec::new();
        let mut breaker_markers = Vec::new();

        let bar_x = DEVICE_WIDTH + PANEL_WIDTH;
        let mut top = 0.0;
        for device in groups {
            let device_height = device.panels.len() as f64 * (PANEL_HEIGHT + PANEL_PADDING);
            labels.push(Label {
                x: 0.0,
                y: top + device_height / 2.0,
                text: device.device.clone(),
                color: colors.color(&device.device),
                size: DEVICE_FONT_SIZE,
            });

            for (pnli, panel) in device.panels.iter().enumerate() {
                let panel_top = top + pnli as f64 * (PANEL_HEIGHT + PANEL_PADDING);
                let panel_key = panel.panel.to_string();
                labels.push(Label {
                    x: DEVICE_WIDTH,
                    y: panel_top + PANEL_HEIGHT / 2.0,
                    color: colors.color(&panel_key),
                    text: panel_key,
                    size: PANEL_FONT_SIZE,
                });

                for reading in &panel.phases {
                    let y = panel_top
                        + reading.phase.index() as f64 * (PHASE_HEIGHT + PHASE_PADDING);
                    let scale = LinearScale::new((0.0, reading.breaker), (0.0, PHASE_WIDTH));

                    phase_bars.push(Bar {
                        x: bar_x,
                        y,
                        width: scale.map(reading.load as f64).max(0.0),
                        height: PHASE_HEIGHT,
                        fill: headroom_color(reading.headroom, reading.phase),
                        title: format!(
                            "{} Panel {} Phase {}: {} Amps",
                            device.device,
                            panel.panel,
                            reading.phase.letter(),
                            reading.load
                        ),
                    });
                    breaker_markers.push(Bar {
                        x: bar_x + scale.map(reading.breaker),
                        y,
                        width: BREAKER_MARKER_WIDTH,
                        height: PHASE_HEIGHT + PHASE_PADDING + DEVICE_PADDING + PANEL_PADDING,
                        fill: breaker_colors.color(&reading.breaker.to_string()),
                        title: format!("Breaker: {} Amps", reading.breaker),
                    });
                }
            }
            top += device_height + DEVICE_PADDING;
        }

        Self {
            text,
            inner_width: DEVICE_WIDTH + PANEL_WIDTH + PHASE_WIDTH,
            inner_height: (top - DEVICE_PADDING).max(0.0),
            labels,
            phase_bars,
            breaker_markers,
        }
    }

    pub fn outer_width(&self) -> f64 {
        self.inner_width + MARGIN.left + MARGIN.right
    }

    pub fn outer_height(&self) -> f64 {
        self.inner_height + TOP_LABEL_BOX + MARGIN.top + MARGIN.bottom
    }

    /// Top-left of the graph area on the canvas.
    pub fn graph_origin(&self) -> (f64, f64) {
        (MARGIN.left, TOP_LABEL_BOX + MARGIN.top)
    }

    /// Bar or breaker marker under a graph-area position. Phase bars win.
    pub fn bar_at(&self, x: f64, y: f64) -> Option<&Bar> {
        self.phase_bars
            .iter()
            .chain(&self.breaker_markers)
            .find(|bar| bar.contains(x, y))
    }

    pub fn to_svg(&self) -> String {
        let mut root = svg::svg_root(self.outer_width(), self.outer_height());
        if !self.text.heading.is_empty() {
            root.push(Element::new("title").text(self.text.heading.as_str()));
        }

        let mut headers =
            Element::new("g").attr("transform", svg::translate(MARGIN.left, MARGIN.top));
        for (x, text, anchor) in COLUMN_HEADERS {
            headers.push(
                Element::new("text")
                    .attr("x", num(x))
                    .attr("y", 0)
                    .attr("text-anchor", anchor.svg_value())
                    .attr("style", format!("font: {HEADER_FONT_SIZE}px sans-serif; fill: {BLACK}"))
                    .text(text),
            );
        }
        root.push(headers);

        let (left, top) = self.graph_origin();
        let mut graph = Element::new("g").attr("transform", svg::translate(left, top));
        for label in &self.labels {
            graph.push(
                Element::new("text")
                    .attr("x", num(label.x))
                    .attr("y", num(label.y))
                    .attr("style", format!("font: {}px sans-serif; fill: {}", label.size, label.color))
                    .text(label.text.as_str()),
            );
        }
        for bar in &self.phase_bars {
            graph.push(bar_element(bar).attr("class", "bar"));
        }
        for marker in &self.breaker_markers {
            graph.push(bar_element(marker).attr("class", "breaker"));
        }
        root.push(graph);

        svg::document(&root)
    }
}

fn bar_element(bar: &Bar) -> Element {
    Element::new("rect")
        .attr("x", num(bar.x))
        .attr("y", num(bar.y))
        .attr("width", num(bar.width))
        .attr("height", num(bar.height))
        .attr("style", format!("fill: {}", bar.fill))
        .child(Element::new("title").text(bar.title.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PanelGroup, PanelReading};

    fn reading(device: &str, panel: u32, phase: Phase, load: i64, headroom: f64) -> PanelReading {
        PanelReading {
            device: device.to_string(),
            panel,
            phase,
            load,
            headroom,
            breaker: 30.0,
        }
    }

    fn groups() -> Vec<DeviceGroup> {
        vec![
            DeviceGroup {
                device: "pdu-1".to_string(),
                panels: vec![
                    PanelGroup {
                        panel: 1,
                        phases: vec![
                            reading("pdu-1", 1, Phase::A, 15, 50.0),
                            reading("pdu-1", 1, Phase::B, 24, 20.0),
                        ],
                    },
                    PanelGroup {
                        panel: 2,
                        phases: vec![reading("pdu-1", 2, Phase::C, 30, 0.0)],
                    },
                ],
            },
            DeviceGroup {
                device: "pdu-2".to_string(),
                panels: vec![PanelGroup {
                    panel: 1,
                    phases: vec![reading("pdu-2", 1, Phase::A, 3, 90.0)],
                }],
            },
        ]
    }

    #[test]
    fn test_headroom_color_ramp() {
        assert_eq!(headroom_color(45.0, Phase::A), Rgb(0, 255, 0));
        assert_eq!(headroom_color(30.0, Phase::B), Rgb(0, 255, 63));
        assert_eq!(headroom_color(25.0, Phase::A), Rgb(128, 255, 0));
        assert_eq!(headroom_color(20.0, Phase::C), Rgb(0, 255, 127));
        assert_eq!(headroom_color(15.0, Phase::A), Rgb(255, 128, 0));
        assert_eq!(headroom_color(10.0, Phase::A), Rgb(255, 0, 0));
        assert_eq!(headroom_color(-5.0, Phase::A), Rgb(255, 0, 0));
    }

    #[test]
    fn test_bar_layout() {
        let chart = PanelChartModel::build(ChartText::default(), &groups());

        assert_eq!(chart.phase_bars.len(), 4);
        let first = &chart.phase_bars[0];
        assert_eq!((first.x, first.y), (135.0, 0.0));
        assert_eq!(first.width, 450.0);
        assert_eq!(first.title, "pdu-1 Panel 1 Phase A: 15 Amps");

        // Phase rows are fixed by letter
        assert_eq!(chart.phase_bars[1].y, 6.0);
        assert_eq!(chart.phase_bars[2].y, 22.0 + 12.0);

        // Second device starts after two panels and the device gap
        assert_eq!(chart.phase_bars[3].y, 2.0 * 22.0 + 10.0);
        assert_eq!(chart.inner_height, 3.0 * 22.0 + 10.0);
        assert_eq!(chart.inner_width, 1035.0);
        assert_eq!(chart.outer_height(), 76.0 + 20.0 + 40.0);
    }

    #[test]
    fn test_breaker_markers() {
        let chart = PanelChartModel::build(ChartText::default(), &groups());
        let marker = &chart.breaker_markers[0];
        assert_eq!(marker.x, 135.0 + 900.0);
        assert_eq!(marker.width, 2.0);
        assert_eq!(marker.title, "Breaker: 30 Amps");
        assert_eq!(marker.fill, BREAKER_PALETTE[0]);
        assert!(chart.breaker_markers.iter().all(|m| m.fill == marker.fill));
    }

    #[test]
    fn test_labels_and_hit_testing() {
        let chart = PanelChartModel::build(ChartText::default(), &groups());
        let texts: Vec<&str> = chart.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["pdu-1", "1", "2", "pdu-2", "1"]);

        let hit = chart.bar_at(200.0, 2.0).unwrap();
        assert_eq!(hit.title, "pdu-1 Panel 1 Phase A: 15 Amps");
        assert_eq!(chart.bar_at(1035.5, 3.0).unwrap().title, "Breaker: 30 Amps");
        assert!(chart.bar_at(10.0, 2.0).is_none());
    }

    #[test]
    fn test_svg_output() {
        let text = ChartText {
            heading: "Row 4 failover".to_string(),
            ..ChartText::default()
        };
        let svg = PanelChartModel::build(text, &groups()).to_svg();

        for header in ["Device", "Panel", "Amps", "Breaker"] {
            assert!(svg.contains(&format!(">{header}</text>")), "{header}");
        }
        assert!(svg.contains("<title>Row 4 failover</title>"));
        assert!(svg.contains("<title>pdu-2 Panel 1 Phase A: 3 Amps</title>"));
        assert!(svg.contains("translate(50,40)"));
    }

    #[test]
    fn test_empty_groups() {
        let chart = PanelChartModel::build(ChartText::default(), &[]);
        assert_eq!(chart.inner_height, 0.0);
        assert!(chart.phase_bars.is_empty());
        assert!(chart.to_svg().contains(">Device</text>"));
    }
}
