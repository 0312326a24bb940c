//! Charts module - Chart layout and rendering

mod bitmap;
mod curve;
mod hover;
mod legend;
mod line_chart;
mod model;
mod palette;
mod panel_chart;
mod scale;
mod style;
mod svg;

pub use curve::{PathGeometry, Point};
pub use hover::{nearest_point, HoverMarker, HoverState, PointerEvent, MARKER_RADIUS};
pub use legend::{sanitize_key, LegendEntry, LegendState};
pub use line_chart::{LineChartModel, PlottedSeries, ReferenceLine, Tick};
pub use model::{ChartError, ChartModel, RenderError};
pub use palette::{Rgb, MOUSE_LINE};
pub use panel_chart::{
    headroom_color, Anchor, Bar, PanelChartModel, COLUMN_HEADERS, MARGIN as PANEL_MARGIN,
};
pub use scale::{ChartLayout, LinearScale, Margin, TimeScale};
pub use style::{
    heading_font, subheading_font, ChartKind, ChartStyle, ChartText, HEADING_ROW, LEGEND_BOX,
};
