//! Data module - feed loading and processing

mod loader;
mod processor;
mod series;

pub use loader::{DataLoader, FeedSource, LoaderError};
pub use processor::{DataProcessor, DeviceGroup, PanelGroup, PanelReading, Phase, ProcessorError};
pub use series::{epoch_to_date, format_epoch, Sample, Series, SeriesSet};
