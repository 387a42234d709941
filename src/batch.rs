//! Offline batch files: login events in (CSV or JSON), predictions and training
//! feature tables out.

use crate::error::{Error, Result};
use crate::event::{LabeledLoginEvent, LoginEvent};
use crate::features::{FeatureTable, FEATURE_LAYOUT};
use crate::scoring::ScoreResult;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// One output line of a batch prediction run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchPrediction {
    #[serde(flatten)]
    pub event: LoginEvent,
    pub is_anomaly_predicted: u8,
    pub probability_normal: f64,
    pub probability_anomaly: f64,
}

impl BatchPrediction {
    pub fn new(event: LoginEvent, score: ScoreResult) -> Self {
        Self {
            event,
            is_anomaly_predicted: score.anomaly,
            probability_normal: score.probability_normal,
            probability_anomaly: score.probability_anomaly,
        }
    }
}

fn batch_err(path: &Path, reason: impl ToString) -> Error {
    Error::Batch {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// `.json` files hold an array of event objects; anything else is read as CSV
/// with a header row.
pub fn read_events(path: &Path) -> Result<Vec<LoginEvent>> {
    if is_json(path) {
        let data = std::fs::read_to_string(path).map_err(|e| batch_err(path, e))?;
        let value: Value = serde_json::from_str(&data).map_err(|e| batch_err(path, e))?;
        let items = value
            .as_array()
            .ok_or_else(|| batch_err(path, "expected a JSON array of login events"))?;
        return items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                LoginEvent::from_json(item).map_err(|e| {
                    Error::from(crate::error::EncodeError::Record {
                        index,
                        source: Box::new(e),
                    })
                })
            })
            .collect();
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| batch_err(path, e))?;
    let mut events = Vec::new();
    for result in reader.deserialize() {
        let event: LoginEvent = result.map_err(|e| batch_err(path, e))?;
        events.push(event);
    }
    Ok(events)
}

/// Labelled training CSV (`is_anomaly` column required).
pub fn read_labeled(path: &Path) -> Result<(Vec<LoginEvent>, Vec<u8>)> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| batch_err(path, e))?;
    let mut events = Vec::new();
    let mut labels = Vec::new();
    for result in reader.deserialize() {
        let row: LabeledLoginEvent = result.map_err(|e| batch_err(path, e))?;
        let (event, label) = row.into_parts();
        events.push(event);
        labels.push(label);
    }
    Ok((events, labels))
}

pub fn write_predictions(
    events: Vec<LoginEvent>,
    scores: &[ScoreResult],
    w: &mut impl Write,
) -> std::io::Result<()> {
    for (event, score) in events.into_iter().zip(scores) {
        crate::logging::StructuredLogger::emit_json(&BatchPrediction::new(event, *score), w)?;
    }
    Ok(())
}

/// Feature columns in model order, then `is_anomaly`.
pub fn write_feature_csv(table: &FeatureTable, labels: &[u8], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| batch_err(path, e))?;
    let mut header: Vec<&str> = FEATURE_LAYOUT.to_vec();
    header.push("is_anomaly");
    wtr.write_record(&header).map_err(|e| batch_err(path, e))?;

    for (row, label) in table.rows().iter().zip(labels) {
        let mut record: Vec<String> = row.values().iter().map(i64::to_string).collect();
        record.push(label.to_string());
        wtr.write_record(&record).map_err(|e| batch_err(path, e))?;
    }
    wtr.flush().map_err(|e| batch_err(path, e))?;
    Ok(())
}
