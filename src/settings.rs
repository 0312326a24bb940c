//! Dashboard configuration: feed fetching, output location and the charts
//! to draw. Read from a TOML file, overridable through `POWERVIEW__*`
//! environment variables (e.g. `POWERVIEW__FETCH__TIMEOUT_SECS=5`).

use crate::charts::{ChartKind, ChartText};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PREFIX: &str = "POWERVIEW";
pub const DEFAULT_CONFIG_FILE: &str = "powerview.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("No chart with id '{0}' in configuration")]
    UnknownChart(String),
    #[error("Chart id '{0}' is configured more than once")]
    DuplicateChart(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("powerview/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("charts"),
        }
    }
}

/// One chart on the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    pub id: String,
    pub kind: ChartKind,
    /// URL or file path of the feed.
    pub source: String,
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub subheadings: Vec<String>,
    #[serde(default)]
    pub y_label: String,
    /// Commit or breaker value; 0 draws no threshold line.
    #[serde(default)]
    pub threshold: f64,
    /// The chart is alone on its page, which enables hover tracking.
    #[serde(default)]
    pub solo: bool,
    /// Series identifiers to start hidden.
    #[serde(default)]
    pub hidden: Vec<String>,
}

impl ChartConfig {
    pub fn text(&self) -> ChartText {
        ChartText {
            heading: self.heading.clone(),
            subheadings: self.subheadings.clone(),
            y_label: self.y_label.clone(),
        }
    }
}

impl DashboardConfig {
    /// Charts to work on: the one named by `id`, or all of them.
    pub fn select(&self, id: Option<&str>) -> Result<Vec<&ChartConfig>, ConfigError> {
        match id {
            Some(id) => self
                .charts
                .iter()
                .find(|c| c.id == id)
                .map(|c| vec![c])
                .ok_or_else(|| ConfigError::UnknownChart(id.to_string())),
            None => Ok(self.charts.iter().collect()),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for chart in &self.charts {
            if !seen.insert(chart.id.as_str()) {
                return Err(ConfigError::DuplicateChart(chart.id.clone()));
            }
        }
        Ok(self)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Load the dashboard from a TOML file plus environment overrides.
pub fn load_dashboard_config(path: &Path) -> Result<DashboardConfig, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(environment())
        .build()?;

    settings.try_deserialize::<DashboardConfig>()?.validate()
}

/// Parse a dashboard from TOML text, without environment overrides.
pub fn parse_dashboard_config(toml: &str) -> Result<DashboardConfig, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    settings.try_deserialize::<DashboardConfig>()?.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASHBOARD: &str = r#"
[fetch]
timeout_secs = 5

[[charts]]
id = "cab-0712"
kind = "cabinet"
source = "https://dash.example.net/feeds/cab-0712.json"
heading = "Cabinet 0712"
subheadings = ["Acme Corp", "Row 4"]
y_label = "kW"
threshold = 4.5
solo = true

[[charts]]
id = "row4-panels"
kind = "panel_failover"
source = "feeds/row4.tsv"
hidden = ["PDU 1"]
"#;

    #[test]
    fn test_parse_dashboard() {
        let config = parse_dashboard_config(DASHBOARD).unwrap();

        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.user_agent, FetchSettings::default().user_agent);
        assert_eq!(config.output.dir, PathBuf::from("charts"));
        assert_eq!(config.charts.len(), 2);

        let cabinet = &config.charts[0];
        assert_eq!(cabinet.kind, ChartKind::Cabinet);
        assert_eq!(cabinet.threshold, 4.5);
        assert!(cabinet.solo);
        assert_eq!(cabinet.text().subheadings, vec!["Acme Corp", "Row 4"]);

        let panels = &config.charts[1];
        assert_eq!(panels.kind, ChartKind::PanelFailover);
        assert_eq!(panels.threshold, 0.0);
        assert!(!panels.solo);
        assert_eq!(panels.hidden, vec!["PDU 1"]);
    }

    #[test]
    fn test_select_chart() {
        let config = parse_dashboard_config(DASHBOARD).unwrap();
        assert_eq!(config.select(None).unwrap().len(), 2);
        assert_eq!(config.select(Some("row4-panels")).unwrap()[0].id, "row4-panels");
        assert!(matches!(
            config.select(Some("nope")),
            Err(ConfigError::UnknownChart(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = parse_dashboard_config(
            r#"
[[charts]]
id = "x"
kind = "pie"
source = "x.json"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = parse_dashboard_config(
            r#"
[[charts]]
id = "x"
kind = "cabinet"
source = "a.json"

[[charts]]
id = "x"
kind = "pdu_panel"
source = "b.json"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateChart(id) if id == "x"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_dashboard_config("").unwrap();
        assert!(config.charts.is_empty());
        assert_eq!(config.fetch, FetchSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("powerview-{}.toml", std::process::id()));
        std::fs::write(&path, DASHBOARD).unwrap();
        let config = load_dashboard_config(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.charts[0].id, "cab-0712");
    }
}
