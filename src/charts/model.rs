//! Chart Model Module
//! Loads a configured chart into its model and writes it to disk.

use crate::charts::bitmap;
use crate::charts::hover::{HoverState, PointerEvent};
use crate::charts::line_chart::LineChartModel;
use crate::charts::panel_chart::PanelChartModel;
use crate::charts::style::ChartKind;
use crate::data::{DataLoader, FeedSource, LoaderError};
use crate::settings::ChartConfig;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Feed has no rows to chart")]
    EmptyChart,
    #[error("'{0}' is not a line chart")]
    NotALineChart(ChartKind),
    #[error("Bitmap backend error: {0}")]
    Backend(String),
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A chart ready to render.
#[derive(Debug, Clone)]
pub enum ChartModel {
    Line(LineChartModel),
    Panel(PanelChartModel),
}

impl ChartModel {
    /// Fetch the chart's feed and lay the chart out.
    pub fn load(loader: &DataLoader, chart: &ChartConfig) -> Result<Self, ChartError> {
        let started = Instant::now();
        let source = FeedSource::parse(&chart.source);

        let model = match chart.kind {
            ChartKind::PanelFailover => {
                let groups = loader.load_panels(&source)?;
                ChartModel::Panel(PanelChartModel::build(chart.text(), &groups))
            }
            kind => {
                let set = loader.load_series(&source)?;
                let mut model =
                    LineChartModel::build(kind, chart.text(), chart.threshold, chart.solo, &set)?;
                for id in &chart.hidden {
                    if !model.legend.set_visible_by_id(id, false) {
                        warn!(chart = %chart.id, series = %id, "hidden series not in feed");
                    }
                }
                ChartModel::Line(model)
            }
        };

        debug!(
            chart = %chart.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built chart model"
        );
        Ok(model)
    }

    /// Hover state as if the pointer entered the plot and stopped at `x`.
    /// `None` for charts without hover tracking.
    pub fn hover_at(&self, x: f64) -> Option<HoverState> {
        match self {
            ChartModel::Line(model) if model.hover_enabled => {
                let mut hover = HoverState::new();
                hover.handle(PointerEvent::Entered, model);
                hover.handle(PointerEvent::Moved { x }, model);
                Some(hover)
            }
            _ => None,
        }
    }

    pub fn to_svg(&self, hover: Option<&HoverState>) -> String {
        match self {
            ChartModel::Line(model) => model.to_svg(hover),
            ChartModel::Panel(model) => model.to_svg(),
        }
    }

    pub fn write_svg(&self, path: &Path, hover: Option<&HoverState>) -> Result<(), RenderError> {
        std::fs::write(path, self.to_svg(hover)).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_png(&self, path: &Path, hover: Option<&HoverState>) -> Result<(), RenderError> {
        match self {
            ChartModel::Line(model) => bitmap::render_line_chart_png(model, hover, path),
            ChartModel::Panel(model) => bitmap::render_panel_chart_png(model, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FetchSettings;
    use std::fs;

    fn chart_config(kind: ChartKind, source: &Path) -> ChartConfig {
        ChartConfig {
            id: "test".to_string(),
            kind,
            source: source.display().to_string(),
            heading: "Cabinet 12".to_string(),
            subheadings: vec![],
            y_label: "Watts".to_string(),
            threshold: 0.0,
            solo: true,
            hidden: vec!["B".to_string(), "missing".to_string()],
        }
    }

    #[test]
    fn test_load_line_chart_hides_configured_series() {
        let path = std::env::temp_dir().join(format!("powerview-model-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"[{"date": 0, "A": 1, "B": 2}, {"date": 60, "A": 3, "B": 4}]"#,
        )
        .unwrap();

        let loader = DataLoader::new(&FetchSettings::default()).unwrap();
        let model = ChartModel::load(&loader, &chart_config(ChartKind::Cabinet, &path)).unwrap();
        fs::remove_file(&path).ok();

        let ChartModel::Line(line) = &model else {
            panic!("expected a line chart");
        };
        assert!(line.legend.is_visible("A"));
        assert!(!line.legend.is_visible("B"));

        let hover = model.hover_at(100.0).unwrap();
        assert!(hover.visible);
        assert_eq!(hover.markers.len(), 1);
        assert!(hover.marker("A").is_some());
        assert!(hover.marker("B").is_none());
    }

    #[test]
    fn test_load_panel_chart_has_no_hover() {
        let path = std::env::temp_dir().join(format!("powerview-model-{}.tsv", std::process::id()));
        fs::write(
            &path,
            "device\tpanel\tphase\tload\theadroom\tbreaker\npdu-1\t1\t1\t10\t40\t20\n",
        )
        .unwrap();

        let loader = DataLoader::new(&FetchSettings::default()).unwrap();
        let model =
            ChartModel::load(&loader, &chart_config(ChartKind::PanelFailover, &path)).unwrap();
        fs::remove_file(&path).ok();

        assert!(matches!(model, ChartModel::Panel(_)));
        assert!(model.hover_at(10.0).is_none());
        assert!(model.to_svg(None).contains("Breaker: 20 Amps"));
    }

    #[test]
    fn test_load_reports_missing_feed() {
        let loader = DataLoader::new(&FetchSettings::default()).unwrap();
        let err = ChartModel::load(
            &loader,
            &chart_config(ChartKind::Cabinet, Path::new("/nonexistent/powerview.json")),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::Load(LoaderError::Io { .. })));
    }
}
