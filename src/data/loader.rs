//! Feed Loader Module
//! Fetches JSON and TSV feeds over HTTP or from disk.

use crate::data::processor::{DataProcessor, DeviceGroup, PanelReading, ProcessorError};
use crate::data::series::SeriesSet;
use crate::settings::FetchSettings;
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Feed {url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON feed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to load TSV: {0}")]
    Table(#[from] PolarsError),
    #[error("Invalid feed: {0}")]
    Process(#[from] ProcessorError),
}

/// Where a feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Http(String),
    File(PathBuf),
}

impl FeedSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            FeedSource::Http(trimmed.to_string())
        } else {
            FeedSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Http(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches feeds and hands them to the processor. One fetch per call, no retry.
pub struct DataLoader {
    client: reqwest::blocking::Client,
}

impl DataLoader {
    pub fn new(settings: &FetchSettings) -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| LoaderError::Http {
                url: String::from("<client>"),
                source,
            })?;
        Ok(Self { client })
    }

    /// Read the raw feed body.
    pub fn fetch(&self, source: &FeedSource) -> Result<Vec<u8>, LoaderError> {
        let bytes = match source {
            FeedSource::Http(url) => {
                let http_err = |source| LoaderError::Http {
                    url: url.clone(),
                    source,
                };
                let response = self.client.get(url).send().map_err(http_err)?;
                let status = response.status();
                if !status.is_success() {
                    warn!(%url, %status, "feed request failed");
                    return Err(LoaderError::Status {
                        url: url.clone(),
                        status,
                    });
                }
                response.bytes().map_err(http_err)?.to_vec()
            }
            FeedSource::File(path) => std::fs::read(path).map_err(|source| LoaderError::Io {
                path: path.clone(),
                source,
            })?,
        };

        info!(%source, bytes = bytes.len(), "fetched feed");
        Ok(bytes)
    }

    /// Fetch a JSON time series feed.
    pub fn load_series(&self, source: &FeedSource) -> Result<SeriesSet, LoaderError> {
        let bytes = self.fetch(source)?;
        parse_series(&bytes)
    }

    /// Fetch a TSV panel load table and nest it device -> panel -> phase.
    pub fn load_panels(&self, source: &FeedSource) -> Result<Vec<DeviceGroup>, LoaderError> {
        let bytes = self.fetch(source)?;
        let readings = parse_panel_table(bytes)?;
        Ok(DataProcessor::nest_panels(readings))
    }
}

/// Decode a JSON feed body into series.
pub fn parse_series(bytes: &[u8]) -> Result<SeriesSet, LoaderError> {
    let feed: serde_json::Value = serde_json::from_slice(bytes)?;
    DataProcessor::series_from_rows(&feed).map_err(|e| {
        warn!(error = %e, "rejected JSON feed");
        LoaderError::from(e)
    })
}

/// Decode a tab separated panel table.
pub fn parse_panel_table(bytes: Vec<u8>) -> Result<Vec<PanelReading>, LoaderError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    DataProcessor::panel_readings(&df).map_err(|e| {
        warn!(error = %e, "rejected panel table");
        LoaderError::from(e)
    })
}
