//! Powerview Main Application
//! Chart list on the left, the selected chart in the center.

use crate::charts::ChartModel;
use crate::data::DataLoader;
use crate::gui::ChartViewer;
use crate::render::ImageFormat;
use crate::settings::{ChartConfig, DashboardConfig, FetchSettings};
use egui::{RichText, SidePanel};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use tracing::{error, info};

const LOADING_TEXT: &str = "Loading data, please stand by...";
const LOADER_STOPPED: &str = "Feed loader stopped unexpectedly";

/// Feed loading result from background thread
enum LoadResult {
    Complete(ChartModel),
    Error(String),
}

enum LoadPoll {
    Pending(Receiver<LoadResult>),
    Done(LoadResult),
}

/// A loader thread that hangs up without sending counts as a failed load.
fn poll_load(rx: Receiver<LoadResult>) -> LoadPoll {
    match rx.try_recv() {
        Ok(result) => LoadPoll::Done(result),
        Err(TryRecvError::Empty) => LoadPoll::Pending(rx),
        Err(TryRecvError::Disconnected) => {
            error!("load thread exited without a result");
            LoadPoll::Done(LoadResult::Error(LOADER_STOPPED.to_string()))
        }
    }
}

/// Main application window.
pub struct PowerviewApp {
    dashboard: DashboardConfig,
    selected: Option<usize>,
    chart_viewer: ChartViewer,
    status: String,

    // Async feed loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
    load_error: Option<String>,
}

impl PowerviewApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dashboard: DashboardConfig,
        initial: Option<usize>,
    ) -> Self {
        let mut app = Self {
            selected: initial.or(if dashboard.charts.is_empty() { None } else { Some(0) }),
            dashboard,
            chart_viewer: ChartViewer::new(),
            status: String::new(),
            load_rx: None,
            is_loading: false,
            load_error: None,
        };
        app.start_load();
        app
    }

    fn selected_chart(&self) -> Option<&ChartConfig> {
        self.selected.and_then(|i| self.dashboard.charts.get(i))
    }

    /// Fetch and build the selected chart off the UI thread.
    fn start_load(&mut self) {
        let Some(chart) = self.selected_chart().cloned() else {
            return;
        };
        let fetch = self.dashboard.fetch.clone();

        self.chart_viewer.clear();
        self.load_error = None;
        self.is_loading = true;
        self.status = format!("Loading {}...", chart.id);

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match Self::load_chart(&fetch, &chart) {
                Ok(model) => LoadResult::Complete(model),
                Err(e) => {
                    error!(chart = %chart.id, error = %e, "failed to load chart");
                    LoadResult::Error(format!("{e:#}"))
                }
            };
            let _ = tx.send(result);
        });
    }

    fn load_chart(fetch: &FetchSettings, chart: &ChartConfig) -> anyhow::Result<ChartModel> {
        let loader = DataLoader::new(fetch)?;
        Ok(ChartModel::load(&loader, chart)?)
    }

    /// Check for feed loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        match poll_load(rx) {
            LoadPoll::Pending(rx) => self.load_rx = Some(rx),
            LoadPoll::Done(LoadResult::Complete(model)) => {
                self.chart_viewer.set_model(model);
                self.status = String::from("Ready");
                self.is_loading = false;
            }
            LoadPoll::Done(LoadResult::Error(error)) => {
                self.status = String::from("Load failed");
                self.load_error = Some(error);
                self.is_loading = false;
            }
        }
    }

    /// Save the displayed chart, hover state included.
    fn handle_export(&mut self, format: ImageFormat) {
        let (Some(model), Some(chart)) = (self.chart_viewer.model(), self.selected_chart()) else {
            self.status = String::from("No chart to export");
            return;
        };

        let ext = format.extension();
        let Some(path) = rfd::FileDialog::new()
            .add_filter(ext.to_uppercase(), &[ext])
            .set_file_name(format!("{}.{ext}", chart.id))
            .save_file()
        else {
            return; // User cancelled
        };

        let hover = Some(self.chart_viewer.hover()).filter(|h| h.visible);
        let result = match format {
            ImageFormat::Svg => model.write_svg(&path, hover),
            ImageFormat::Png => model.write_png(&path, hover),
        };
        self.status = match result {
            Ok(()) => {
                info!(path = %path.display(), "exported chart");
                format!("Saved {}", display_name(&path))
            }
            Err(e) => format!("Export error: {e}"),
        };
    }

    fn show_chart_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Charts");
        ui.separator();

        let mut clicked = None;
        for (i, chart) in self.dashboard.charts.iter().enumerate() {
            let label = if chart.heading.is_empty() {
                chart.id.clone()
            } else {
                format!("{} ({})", chart.heading, chart.kind)
            };
            if ui
                .selectable_label(self.selected == Some(i), label)
                .clicked()
            {
                clicked = Some(i);
            }
        }
        if let Some(i) = clicked {
            if self.selected != Some(i) {
                self.selected = Some(i);
                self.start_load();
            }
        }

        ui.separator();
        ui.add_enabled_ui(!self.is_loading, |ui| {
            if ui.button("Reload").clicked() {
                self.start_load();
            }
            if ui.button("Export SVG...").clicked() {
                self.handle_export(ImageFormat::Svg);
            }
            if ui.button("Export PNG...").clicked() {
                self.handle_export(ImageFormat::Png);
            }
        });

        ui.separator();
        ui.label(RichText::new(&self.status).small());
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for PowerviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("chart_list")
            .min_width(220.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.show_chart_list(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_loading {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(LOADING_TEXT).size(32.0).color(egui::Color32::from_gray(0x40)));
                });
            } else if let Some(error) = &self.load_error {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(error).size(16.0).color(egui::Color32::RED));
                });
            } else {
                self.chart_viewer.show(ctx, ui);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_load_waits_while_loader_runs() {
        let (tx, rx) = channel::<LoadResult>();
        let LoadPoll::Pending(rx) = poll_load(rx) else {
            panic!("expected the load to be pending");
        };

        tx.send(LoadResult::Error("boom".to_string())).unwrap();
        assert!(matches!(
            poll_load(rx),
            LoadPoll::Done(LoadResult::Error(e)) if e == "boom"
        ));
    }

    #[test]
    fn test_poll_load_reports_dead_loader() {
        let (tx, rx) = channel::<LoadResult>();
        drop(tx);
        assert!(matches!(
            poll_load(rx),
            LoadPoll::Done(LoadResult::Error(e)) if e == LOADER_STOPPED
        ));
    }
}
