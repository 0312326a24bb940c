//! Data Processor Module
//! Validates feed rows and reshapes them into chartable series and panel trees.

use crate::data::series::{Sample, Series, SeriesSet};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Column holding the epoch timestamp in JSON feeds.
pub const DATE_FIELD: &str = "date";

/// Columns every panel load table must carry.
pub const PANEL_COLUMNS: [&str; 6] = ["device", "panel", "phase", "load", "headroom", "breaker"];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Feed must be a JSON array of rows")]
    NotAnArray,
    #[error("Row {row} is not an object")]
    NotAnObject { row: usize },
    #[error("Row {row} has no numeric 'date' field")]
    MissingDate { row: usize },
    #[error("Row {row} has a non-numeric value for '{field}'")]
    InvalidValue { row: usize, field: String },
    #[error("Row {row} is not later than the previous row")]
    NonIncreasingTime { row: usize },
    #[error("Table is missing column '{0}'")]
    MissingColumn(String),
    #[error("Row {row} is missing '{field}'")]
    MissingField { row: usize, field: &'static str },
    #[error("Row {row} has phase {phase}, expected 1, 2 or 3")]
    InvalidPhase { row: usize, phase: f64 },
    #[error("Row {row} has a breaker rating that is not positive")]
    InvalidBreaker { row: usize },
}

/// Electrical phase of a panel circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    /// Feeds number phases from 1.
    pub fn from_number(n: f64) -> Option<Self> {
        match n {
            n if n == 1.0 => Some(Phase::A),
            n if n == 2.0 => Some(Phase::B),
            n if n == 3.0 => Some(Phase::C),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Phase::A => 0,
            Phase::B => 1,
            Phase::C => 2,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Phase::A => 'A',
            Phase::B => 'B',
            Phase::C => 'C',
        }
    }
}

/// One row of the panel load table.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelReading {
    pub device: String,
    pub panel: u32,
    pub phase: Phase,
    /// Amps, truncated to whole amps like the upstream feed intends.
    pub load: i64,
    /// Percent of breaker capacity still available.
    pub headroom: f64,
    /// Breaker rating in amps.
    pub breaker: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelGroup {
    pub panel: u32,
    pub phases: Vec<PanelReading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceGroup {
    pub device: String,
    pub panels: Vec<PanelGroup>,
}

/// Handles feed validation and reshaping.
pub struct DataProcessor;

impl DataProcessor {
    /// Split a JSON feed of wide rows into one series per non-date column.
    ///
    /// Series identifiers come from the first row, in feed order. A `null`
    /// or absent value is a gap in that series; the row still counts towards
    /// the time extent.
    pub fn series_from_rows(feed: &Value) -> Result<SeriesSet, ProcessorError> {
        let rows = feed.as_array().ok_or(ProcessorError::NotAnArray)?;
        let Some(first) = rows.first() else {
            return Ok(SeriesSet::default());
        };

        let ids: Vec<String> = first
            .as_object()
            .ok_or(ProcessorError::NotAnObject { row: 0 })?
            .keys()
            .filter(|key| key.as_str() != DATE_FIELD)
            .cloned()
            .collect();

        let mut series: Vec<Series> = ids.iter().map(Series::new).collect();
        let mut extent: Option<(f64, f64)> = None;

        for (row, value) in rows.iter().enumerate() {
            let object = value
                .as_object()
                .ok_or(ProcessorError::NotAnObject { row })?;

            let time = object
                .get(DATE_FIELD)
                .and_then(Self::numeric)
                .ok_or(ProcessorError::MissingDate { row })?;

            if let Some((_, last)) = extent {
                if time <= last {
                    return Err(ProcessorError::NonIncreasingTime { row });
                }
            }
            extent = Some(extent.map_or((time, time), |(start, _)| (start, time)));

            for s in series.iter_mut() {
                if let Some(v) = Self::field_value(object, &s.id, row)? {
                    s.samples.push(Sample::new(time, v));
                }
            }
        }

        Ok(SeriesSet { series, extent })
    }

    fn field_value(
        object: &Map<String, Value>,
        field: &str,
        row: usize,
    ) -> Result<Option<f64>, ProcessorError> {
        match object.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => Self::numeric(v)
                .map(Some)
                .ok_or_else(|| ProcessorError::InvalidValue {
                    row,
                    field: field.to_string(),
                }),
        }
    }

    /// Numbers, and strings that hold a number.
    fn numeric(value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        // "NaN" and "inf" parse as floats but cannot be plotted
        number.filter(|v| v.is_finite())
    }

    /// Extract typed panel readings from a loaded table.
    pub fn panel_readings(df: &DataFrame) -> Result<Vec<PanelReading>, ProcessorError> {
        for name in PANEL_COLUMNS {
            if df.column(name).is_err() {
                return Err(ProcessorError::MissingColumn(name.to_string()));
            }
        }

        let device_str = df.column("device")?.cast(&DataType::String)?;
        let device_ca = device_str.str()?;
        let panel_f64 = df.column("panel")?.cast(&DataType::Float64)?;
        let phase_f64 = df.column("phase")?.cast(&DataType::Float64)?;
        let load_f64 = df.column("load")?.cast(&DataType::Float64)?;
        let headroom_f64 = df.column("headroom")?.cast(&DataType::Float64)?;
        let breaker_f64 = df.column("breaker")?.cast(&DataType::Float64)?;

        let panel_ca = panel_f64.f64()?;
        let phase_ca = phase_f64.f64()?;
        let load_ca = load_f64.f64()?;
        let headroom_ca = headroom_f64.f64()?;
        let breaker_ca = breaker_f64.f64()?;

        let mut readings = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let device_name = device_ca
                .get(row)
                .ok_or(ProcessorError::MissingField {
                    row,
                    field: "device",
                })?
                .to_string();

            let panel = panel_ca
                .get(row)
                .filter(|p| p.is_finite() && *p >= 0.0)
                .ok_or(ProcessorError::MissingField { row, field: "panel" })?;
            let phase_number = phase_ca
                .get(row)
                .ok_or(ProcessorError::MissingField { row, field: "phase" })?;
            let phase = Phase::from_number(phase_number).ok_or(ProcessorError::InvalidPhase {
                row,
                phase: phase_number,
            })?;
            let load = load_ca
                .get(row)
                .filter(|l| l.is_finite())
                .ok_or(ProcessorError::MissingField { row, field: "load" })?;
            let headroom = headroom_ca
                .get(row)
                .ok_or(ProcessorError::MissingField {
                    row,
                    field: "headroom",
                })?;
            let breaker = breaker_ca
                .get(row)
                .ok_or(ProcessorError::MissingField {
                    row,
                    field: "breaker",
                })?;
            if !(breaker > 0.0) {
                return Err(ProcessorError::InvalidBreaker { row });
            }

            readings.push(PanelReading {
                device: device_name,
                panel: panel as u32,
                phase,
                load: load.trunc() as i64,
                headroom,
                breaker,
            });
        }

        Ok(readings)
    }

    /// Group readings by device, then panel, then phase, each level ascending.
    ///
    /// Panels sort numerically. When a phase appears twice for one panel the
    /// first reading wins.
    pub fn nest_panels(readings: Vec<PanelReading>) -> Vec<DeviceGroup> {
        let mut tree: BTreeMap<String, BTreeMap<u32, BTreeMap<Phase, PanelReading>>> =
            BTreeMap::new();

        for reading in readings {
            tree.entry(reading.device.clone())
                .or_default()
                .entry(reading.panel)
                .or_default()
                .entry(reading.phase)
                .or_insert(reading);
        }

        tree.into_iter()
            .map(|(device, panels)| DeviceGroup {
                device,
                panels: panels
                    .into_iter()
                    .map(|(panel, phases)| PanelGroup {
                        panel,
                        phases: phases.into_values().collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_series_from_rows_keeps_feed_order() {
        let feed = json!([
            {"date": 100, "whip 2": 5.0, "whip 1": 1.0},
            {"date": 160, "whip 2": 6.5, "whip 1": null},
            {"date": 220, "whip 2": "7", "whip 1": 3.0}
        ]);

        let set = DataProcessor::series_from_rows(&feed).unwrap();
        let ids: Vec<&str> = set.series.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["whip 2", "whip 1"]);
        assert_eq!(set.extent, Some((100.0, 220.0)));

        let whip1 = set.get("whip 1").unwrap();
        assert_eq!(
            whip1.samples,
            vec![Sample::new(100.0, 1.0), Sample::new(220.0, 3.0)]
        );
        assert_eq!(set.get("whip 2").unwrap().samples[2].value, 7.0);
    }

    #[test]
    fn test_empty_feed_has_no_extent() {
        let set = DataProcessor::series_from_rows(&json!([])).unwrap();
        assert!(set.is_empty());
        assert!(set.series.is_empty());
    }

    #[test]
    fn test_rejects_non_array_feed() {
        let err = DataProcessor::series_from_rows(&json!({"date": 1})).unwrap_err();
        assert!(matches!(err, ProcessorError::NotAnArray));
    }

    #[test]
    fn test_rejects_missing_date() {
        let feed = json!([{"date": 1, "a": 1}, {"a": 2}]);
        let err = DataProcessor::series_from_rows(&feed).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingDate { row: 1 }));
    }

    #[test]
    fn test_rejects_non_numeric_value() {
        let feed = json!([{"date": 1, "a": 1}, {"date": 2, "a": "n/a"}]);
        let err = DataProcessor::series_from_rows(&feed).unwrap_err();
        match err {
            ProcessorError::InvalidValue { row, field } => {
                assert_eq!(row, 1);
                assert_eq!(field, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_non_finite_values() {
        for bad in ["NaN", "inf", "-inf"] {
            let feed = json!([{"date": 0, "a": 1}, {"date": 60, "a": bad}, {"date": 120, "a": 3}]);
            let err = DataProcessor::series_from_rows(&feed).unwrap_err();
            assert!(
                matches!(err, ProcessorError::InvalidValue { row: 1, .. }),
                "{bad} accepted: {err}"
            );
        }
    }

    #[test]
    fn test_rejects_time_going_backwards() {
        let feed = json!([{"date": 5, "a": 1}, {"date": 5, "a": 2}]);
        let err = DataProcessor::series_from_rows(&feed).unwrap_err();
        assert!(matches!(err, ProcessorError::NonIncreasingTime { row: 1 }));
    }

    fn reading(device: &str, panel: u32, phase: Phase, load: i64) -> PanelReading {
        PanelReading {
            device: device.to_string(),
            panel,
            phase,
            load,
            headroom: 50.0,
            breaker: 30.0,
        }
    }

    #[test]
    fn test_nest_panels_sorts_every_level() {
        let nested = DataProcessor::nest_panels(vec![
            reading("pdu-b", 2, Phase::C, 4),
            reading("pdu-a", 10, Phase::A, 1),
            reading("pdu-a", 2, Phase::B, 2),
            reading("pdu-a", 2, Phase::A, 3),
            reading("pdu-a", 2, Phase::A, 99),
        ]);

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].device, "pdu-a");
        let panels: Vec<u32> = nested[0].panels.iter().map(|p| p.panel).collect();
        assert_eq!(panels, vec![2, 10]);

        let phases: Vec<(Phase, i64)> = nested[0].panels[0]
            .phases
            .iter()
            .map(|r| (r.phase, r.load))
            .collect();
        assert_eq!(phases, vec![(Phase::A, 3), (Phase::B, 2)]);
    }

    #[test]
    fn test_phase_numbers() {
        assert_eq!(Phase::from_number(2.0), Some(Phase::B));
        assert_eq!(Phase::from_number(4.0), None);
        assert_eq!(Phase::C.letter(), 'C');
        assert_eq!(Phase::C.index(), 2);
    }

    #[test]
    fn test_panel_readings_from_frame() {
        let df = df!(
            "device" => ["pdu-1", "pdu-1"],
            "panel" => [1i64, 1],
            "phase" => [1i64, 3],
            "load" => [12.9f64, 4.0],
            "headroom" => [25.0f64, 80.0],
            "breaker" => [30i64, 30]
        )
        .unwrap();

        let readings = DataProcessor::panel_readings(&df).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].device, "pdu-1");
        assert_eq!(readings[0].load, 12);
        assert_eq!(readings[1].phase, Phase::C);
        assert_eq!(readings[1].breaker, 30.0);
    }

    #[test]
    fn test_panel_readings_keep_device_quotes() {
        let df = df!(
            "device" => [Some("\"east\" pdu"), None],
            "panel" => [1i64, 2],
            "phase" => [1i64, 1],
            "load" => [1.0f64, 1.0],
            "headroom" => [25.0f64, 25.0],
            "breaker" => [30i64, 30]
        )
        .unwrap();

        let err = DataProcessor::panel_readings(&df).unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::MissingField { row: 1, field: "device" }
        ));

        let first = df.slice(0, 1);
        let readings = DataProcessor::panel_readings(&first).unwrap();
        assert_eq!(readings[0].device, "\"east\" pdu");
    }

    #[test]
    fn test_panel_readings_reject_bad_phase() {
        let df = df!(
            "device" => ["pdu-1"],
            "panel" => [1i64],
            "phase" => [7i64],
            "load" => [1.0f64],
            "headroom" => [25.0f64],
            "breaker" => [30i64]
        )
        .unwrap();

        let err = DataProcessor::panel_readings(&df).unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidPhase { row: 0, .. }));
    }

    #[test]
    fn test_panel_readings_require_columns() {
        let df = df!("device" => ["pdu-1"]).unwrap();
        let err = DataProcessor::panel_readings(&df).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(name) if name == "panel"));
    }
}
