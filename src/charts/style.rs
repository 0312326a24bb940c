//! Chart Style Module
//! The fixed dashboard chart kinds and the per-kind layout presets.

use crate::charts::palette::{Rgb, HEADING, SUBHEADING, SUBHEADING_MINOR};
use crate::charts::scale::{ChartLayout, Margin};
use serde::Deserialize;
use std::fmt;

/// Legend swatch size; legend rows are spaced two swatches apart.
pub const LEGEND_BOX: f64 = 10.0;
/// Headings move down by this much when reference lines are drawn.
pub const THRESHOLD_HEADING_OFFSET: f64 = 50.0;
/// Baseline of the main heading, relative to the plot top.
pub const HEADING_ROW: f64 = 20.0;
pub const HEADING_SIZE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Customer cabinet power/bandwidth, optionally with a kW commit.
    Cabinet,
    /// PDU failover load with the breaker size line and legend toggling.
    PduFailover,
    /// PDU panel current by day.
    PduPanel,
    /// SNMP OID current readings.
    OidCurrent,
    /// Per-phase panel load bars against breaker ratings.
    PanelFailover,
}

impl ChartKind {
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Cabinet => "cabinet",
            ChartKind::PduFailover => "pdu_failover",
            ChartKind::PduPanel => "pdu_panel",
            ChartKind::OidCurrent => "oid_current",
            ChartKind::PanelFailover => "panel_failover",
        }
    }

    /// Layout preset for the line chart kinds, `None` for the bar chart.
    pub fn line_style(self) -> Option<ChartStyle> {
        let style = match self {
            ChartKind::Cabinet => ChartStyle {
                layout: layout(1100.0, 400.0, Margin::new(20.0, 250.0, 50.0, 80.0)),
                tick_format: "%Y-%m-%d %H:%M",
                threshold_label: Some("Commit"),
                max_line: true,
                subheading_rows: &[50.0, 80.0, 180.0],
                hover: true,
                toggle: false,
            },
            ChartKind::PduFailover => ChartStyle {
                layout: layout(1300.0, 650.0, Margin::new(20.0, 300.0, 50.0, 80.0)),
                tick_format: "%Y-%m-%d %H:%M",
                threshold_label: Some("Breaker Size"),
                max_line: false,
                subheading_rows: &[50.0, 80.0, 110.0, 140.0],
                hover: false,
                toggle: true,
            },
            ChartKind::PduPanel => ChartStyle {
                layout: layout(1050.0, 400.0, Margin::new(20.0, 250.0, 50.0, 50.0)),
                tick_format: "%Y-%m-%d",
                threshold_label: None,
                max_line: false,
                subheading_rows: &[50.0, 80.0],
                hover: false,
                toggle: false,
            },
            ChartKind::OidCurrent => ChartStyle {
                layout: layout(1050.0, 400.0, Margin::new(20.0, 250.0, 50.0, 50.0)),
                tick_format: "%Y-%m-%d %H:%M",
                threshold_label: None,
                max_line: false,
                subheading_rows: &[50.0, 80.0, 110.0, 140.0],
                hover: false,
                toggle: false,
            },
            ChartKind::PanelFailover => return None,
        };
        Some(style)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn layout(outer_width: f64, outer_height: f64, margin: Margin) -> ChartLayout {
    ChartLayout {
        outer_width,
        outer_height,
        margin,
    }
}

/// Per-instance settings of a line chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub layout: ChartLayout,
    /// strftime pattern for x-axis tick labels.
    pub tick_format: &'static str,
    /// Label of the threshold line; kinds without one ignore the threshold.
    pub threshold_label: Option<&'static str>,
    /// Also draw a line at the series maximum when a threshold is drawn.
    pub max_line: bool,
    /// Baselines of the sub-headings, relative to the plot top.
    pub subheading_rows: &'static [f64],
    pub hover: bool,
    pub toggle: bool,
}

/// Font size and color of the `index`-th sub-heading.
pub fn subheading_font(index: usize) -> (f64, Rgb) {
    if index == 0 {
        (20.0, SUBHEADING)
    } else {
        (15.0, SUBHEADING_MINOR)
    }
}

pub fn heading_font() -> (f64, Rgb) {
    (HEADING_SIZE, HEADING)
}

/// Texts supplied by the caller of a chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartText {
    pub heading: String,
    pub subheadings: Vec<String>,
    pub y_label: String,
}
