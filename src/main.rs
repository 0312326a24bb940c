//! Powerview - Colocation Power Dashboard Charts
//!
//! Renders cabinet power, PDU failover and panel load charts from JSON/TSV
//! feeds, either to SVG/PNG files or in an interactive viewer.

mod charts;
mod data;
mod gui;
mod render;
mod settings;
mod stats;

use anyhow::Context;
use clap::{Parser, Subcommand};
use data::DataLoader;
use render::{render_all, ImageFormat, RenderOptions};
use settings::{load_dashboard_config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "powerview", version, about)]
struct Cli {
    /// Dashboard configuration file
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write charts to image files
    Render {
        /// Only render the chart with this id
        #[arg(long)]
        chart: Option<String>,
        /// Output directory, overriding the configured one
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write PNG instead of SVG
        #[arg(long)]
        png: bool,
        /// Draw hover markers as if the pointer sat at this plot x (pixels)
        #[arg(long, value_name = "X", allow_negative_numbers = true)]
        pointer_x: Option<f64>,
        /// Open each written file with the system viewer
        #[arg(long)]
        open: bool,
    },
    /// Browse charts interactively
    View {
        /// Chart to show first
        #[arg(long)]
        chart: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let dashboard = load_dashboard_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Render {
            chart,
            out,
            png,
            pointer_x,
            open,
        } => {
            let charts = dashboard.select(chart.as_deref())?;
            let loader = DataLoader::new(&dashboard.fetch)?;
            let options = RenderOptions {
                out_dir: out.unwrap_or_else(|| dashboard.output.dir.clone()),
                format: if png { ImageFormat::Png } else { ImageFormat::Svg },
                pointer_x,
            };

            let rendered = render_all(&loader, &charts, &options)?;
            let failed = rendered.iter().filter(|r| r.result.is_err()).count();

            if open {
                for path in rendered.iter().filter_map(|r| r.result.as_ref().ok()) {
                    if let Err(e) = open::that(path) {
                        warn!(path = %path.display(), error = %e, "could not open chart");
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{failed} of {} charts failed", rendered.len());
            }
            Ok(())
        }
        Command::View { chart } => gui::run(dashboard, chart.as_deref()),
    }
}
