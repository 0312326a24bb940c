//! Batch Rendering
//! Loads every selected chart and writes it to the output directory.

use crate::charts::{ChartError, ChartModel, RenderError};
use crate::data::DataLoader;
use crate::settings::ChartConfig;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub out_dir: PathBuf,
    pub format: ImageFormat,
    /// Draw the hover overlay as if the pointer sat at this plot-local x.
    pub pointer_x: Option<f64>,
}

/// Outcome of one chart.
#[derive(Debug)]
pub struct RenderedChart {
    pub id: String,
    pub result: Result<PathBuf, ChartError>,
}

pub fn output_path(out_dir: &Path, id: &str, format: ImageFormat) -> PathBuf {
    out_dir.join(format!("{id}.{}", format.extension()))
}

/// Render one chart to its output file.
pub fn render_chart(
    loader: &DataLoader,
    chart: &ChartConfig,
    options: &RenderOptions,
) -> Result<PathBuf, ChartError> {
    let started = Instant::now();
    let model = ChartModel::load(loader, chart)?;
    let hover = options.pointer_x.and_then(|x| model.hover_at(x));

    let path = output_path(&options.out_dir, &chart.id, options.format);
    match options.format {
        ImageFormat::Svg => model.write_svg(&path, hover.as_ref())?,
        ImageFormat::Png => model.write_png(&path, hover.as_ref())?,
    }

    debug!(
        chart = %chart.id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered chart"
    );
    Ok(path)
}

/// Render charts in parallel. Charts share nothing but the HTTP client, so
/// one failure does not stop the others.
pub fn render_all(
    loader: &DataLoader,
    charts: &[&ChartConfig],
    options: &RenderOptions,
) -> Result<Vec<RenderedChart>, RenderError> {
    std::fs::create_dir_all(&options.out_dir).map_err(|source| RenderError::Io {
        path: options.out_dir.clone(),
        source,
    })?;

    let rendered: Vec<RenderedChart> = charts
        .par_iter()
        .map(|chart| {
            let result = render_chart(loader, chart, options);
            match &result {
                Ok(path) => info!(chart = %chart.id, path = %path.display(), "wrote chart"),
                Err(e) => error!(chart = %chart.id, error = %e, "chart failed"),
            }
            RenderedChart {
                id: chart.id.clone(),
                result,
            }
        })
        .collect();

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use crate::settings::FetchSettings;
    use std::fs;

    fn workdir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("powerview-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn chart(id: &str, source: &Path) -> ChartConfig {
        ChartConfig {
            id: id.to_string(),
            kind: ChartKind::Cabinet,
            source: source.display().to_string(),
            heading: "Cabinet".to_string(),
            subheadings: vec![],
            y_label: "kW".to_string(),
            threshold: 0.0,
            solo: true,
            hidden: vec![],
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out"), "cab-1", ImageFormat::Png),
            PathBuf::from("out/cab-1.png")
        );
    }

    #[test]
    fn test_render_all_keeps_going_after_failure() {
        let dir = workdir("render");
        let feed = dir.join("feed.json");
        fs::write(&feed, r#"[{"date": 0, "A": 1}, {"date": 60, "A": 2}]"#).unwrap();

        let good = chart("good", &feed);
        let bad = chart("bad", &dir.join("missing.json"));
        let options = RenderOptions {
            out_dir: dir.join("out"),
            format: ImageFormat::Svg,
            pointer_x: Some(385.0),
        };

        let loader = DataLoader::new(&FetchSettings::default()).unwrap();
        let rendered = render_all(&loader, &[&good, &bad], &options).unwrap();

        assert_eq!(rendered.len(), 2);
        let written = rendered[0].result.as_ref().unwrap();
        let svg = fs::read_to_string(written).unwrap();
        assert!(svg.contains("mouse-over-effects"));
        assert!(svg.contains("M385,"));
        assert!(rendered[1].result.is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
