// Mappers from domain models to JSON views
use crate::domain::dashboard::{ExportTable, History};
use crate::domain::metric::ScaledReading;
use crate::domain::range::RangeBand;
use crate::domain::tank::TankPreset;
use crate::infrastructure::csv_stream::format_timestamp;
use chrono::TimeZone;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub error: String,
}

impl ErrorView {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RangeBandView {
    pub param: String,
    pub min: f64,
    pub max: f64,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub unit: String,
    pub dynamic: bool,
    pub mean: Option<f64>,
    pub samples: usize,
}

impl From<&RangeBand> for RangeBandView {
    fn from(band: &RangeBand) -> Self {
        Self {
            param: band.param.clone(),
            min: band.min,
            max: band.max,
            ideal_min: band.ideal_min,
            ideal_max: band.ideal_max,
            unit: band.unit.clone(),
            dynamic: band.is_dynamic(),
            mean: band.mean(),
            samples: band.samples(),
        }
    }
}

pub fn ranges_view(bands: &BTreeMap<String, RangeBand>) -> BTreeMap<String, RangeBandView> {
    bands
        .iter()
        .map(|(param, band)| (param.clone(), RangeBandView::from(band)))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct PresetView {
    pub name: String,
    pub title: String,
    pub description: String,
    pub params: Vec<String>,
}

impl From<&TankPreset> for PresetView {
    fn from(preset: &TankPreset) -> Self {
        Self {
            name: preset.name.clone(),
            title: preset.display_name(),
            description: preset.description.clone(),
            params: preset.ranges.keys().cloned().collect(),
        }
    }
}

pub fn current_view(reading: &ScaledReading) -> Map<String, Value> {
    reading
        .values
        .iter()
        .map(|v| (v.name.clone(), Value::from(v.value)))
        .collect()
}

/// `{"timestamps": [...], "<metric>": [...], ...}` with nulls for absent samples
pub fn history_view<Tz: TimeZone>(history: &History, tz: &Tz) -> Map<String, Value>
where
    Tz::Offset: std::fmt::Display,
{
    let mut view = Map::new();
    view.insert(
        "timestamps".to_string(),
        history
            .timestamps_ms
            .iter()
            .map(|&ts| Value::from(format_timestamp(ts, tz)))
            .collect(),
    );
    for series in &history.series {
        view.insert(
            series.name.clone(),
            series.values.iter().map(|v| Value::from(*v)).collect(),
        );
    }
    view
}

#[derive(Debug, Serialize)]
pub struct ExportColumnView<'a> {
    pub name: &'a str,
    pub header: &'a str,
    pub values: &'a [Option<f64>],
}

#[derive(Debug, Serialize)]
pub struct ExportView<'a> {
    pub timestamps: Vec<String>,
    pub columns: Vec<ExportColumnView<'a>>,
}

pub fn export_view<'a, Tz: TimeZone>(table: &'a ExportTable, tz: &Tz) -> ExportView<'a>
where
    Tz::Offset: std::fmt::Display,
{
    ExportView {
        timestamps: table
            .timestamps_ms
            .iter()
            .map(|&ts| format_timestamp(ts, tz))
            .collect(),
        columns: table
            .columns
            .iter()
            .map(|c| ExportColumnView {
                name: &c.name,
                header: &c.header,
                values: &c.values,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::HistorySeries;
    use crate::domain::range::RangeSource;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_range_band_view() {
        let band = RangeBand {
            param: "ph".to_string(),
            min: 6.5,
            max: 8.5,
            ideal_min: 6.65,
            ideal_max: 7.65,
            unit: String::new(),
            source: RangeSource::Dynamic { mean: 7.15, samples: 4 },
        };
        let view = serde_json::to_value(RangeBandView::from(&band)).unwrap();
        assert_eq!(
            view,
            json!({
                "param": "ph", "min": 6.5, "max": 8.5, "ideal_min": 6.65, "ideal_max": 7.65,
                "unit": "", "dynamic": true, "mean": 7.15, "samples": 4
            })
        );

        let static_band = RangeBand {
            source: RangeSource::Static,
            ..band
        };
        let view = serde_json::to_value(RangeBandView::from(&static_band)).unwrap();
        assert_eq!(view["dynamic"], json!(false));
        assert_eq!(view["mean"], Value::Null);
    }

    #[test]
    fn test_history_view() {
        let history = History {
            timestamps_ms: vec![1_700_000_000_000],
            series: vec![
                HistorySeries {
                    name: "ph".to_string(),
                    values: vec![Some(7.23)],
                },
                HistorySeries {
                    name: "orp".to_string(),
                    values: vec![None],
                },
                HistorySeries {
                    name: "sg".to_string(),
                    values: vec![],
                },
            ],
        };

        let view = Value::Object(history_view(&history, &Utc));
        assert_eq!(
            view,
            json!({
                "timestamps": ["2023-11-14 22:13:20"],
                "ph": [7.23],
                "orp": [null],
                "sg": []
            })
        );
    }
}
