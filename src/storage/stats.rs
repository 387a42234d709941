//! Dashboard statistics over the stored history.

use super::PredictionRecord;
use crate::features::parse_timestamp;
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionStats {
    pub total_predictions: usize,
    pub anomaly_count: usize,
    pub normal_count: usize,
    /// Share of normal predictions; 0 for an empty history.
    pub accuracy: f64,
    /// All 24 hours present, zero-filled.
    pub hourly_distribution: BTreeMap<u32, u64>,
    pub geographic_distribution: BTreeMap<String, u64>,
}

impl Default for PredictionStats {
    fn default() -> Self {
        Self {
            total_predictions: 0,
            anomaly_count: 0,
            normal_count: 0,
            accuracy: 0.0,
            hourly_distribution: (0..24).map(|h| (h, 0)).collect(),
            geographic_distribution: BTreeMap::new(),
        }
    }
}

impl PredictionStats {
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let total = records.len();
        let anomalies = records.iter().filter(|r| r.prediction.is_anomaly()).count();
        let normal = total - anomalies;
        let mut s = PredictionStats {
            total_predictions: total,
            anomaly_count: anomalies,
            normal_count: normal,
            accuracy: if total == 0 { 0.0 } else { normal as f64 / total as f64 },
            ..PredictionStats::default()
        };

        for r in records {
            if let Some(hour) = record_hour(r) {
                *s.hourly_distribution.entry(hour).or_default() += 1;
            }
            if let Some(geo) = r.input_data.get("geo_location").and_then(|v| v.as_str()) {
                if !geo.is_empty() {
                    *s.geographic_distribution.entry(geo.to_string()).or_default() += 1;
                }
            }
        }
        s
    }
}

/// Hour of the scoring time, falling back to the login's own timestamp.
fn record_hour(r: &PredictionRecord) -> Option<u32> {
    let raw = if r.timestamp.is_empty() {
        r.input_data.get("timestamp")?.as_str()?
    } else {
        r.timestamp.as_str()
    };
    parse_timestamp(raw).map(|dt| dt.hour())
}
