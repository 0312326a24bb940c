//! GUI module - User interface components

mod app;
mod chart_viewer;

pub use app::PowerviewApp;
pub use chart_viewer::ChartViewer;

use crate::settings::{ConfigError, DashboardConfig};

/// Open the viewer window, starting on `chart` when given.
pub fn run(dashboard: DashboardConfig, chart: Option<&str>) -> anyhow::Result<()> {
    let initial = match chart {
        Some(id) => Some(
            dashboard
                .charts
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| ConfigError::UnknownChart(id.to_string()))?,
        ),
        None => None,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 800.0])
            .with_min_inner_size([1000.0, 500.0])
            .with_title("Powerview"),
        ..Default::default()
    };

    eframe::run_native(
        "Powerview",
        options,
        Box::new(move |cc| Ok(Box::new(PowerviewApp::new(cc, dashboard, initial)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
