//! Prediction history: an append-with-cap log of scored requests, plus stats.

mod json_file;
mod memory;
mod stats;

pub use json_file::JsonFileHistory;
pub use memory::MemoryHistory;
pub use stats::PredictionStats;

use crate::error::HistoryError;
use crate::scoring::ScoreResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of records kept; older ones are dropped first.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Request body exactly as received.
    pub input_data: Value,
    pub prediction: ScoreResult,
    /// Local time the request was scored.
    #[serde(default)]
    pub timestamp: String,
}

impl PredictionRecord {
    pub fn new(input_data: Value, prediction: ScoreResult) -> Self {
        Self {
            input_data,
            prediction,
            timestamp: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        }
    }
}

/// Single-writer history log. Implementations serialize `append` so the
/// read-append-truncate-write cycle never interleaves within a process.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: PredictionRecord) -> Result<(), HistoryError>;

    /// Most-recent-last, at most `capacity()` records.
    fn records(&self) -> Result<Vec<PredictionRecord>, HistoryError>;

    fn capacity(&self) -> usize;
}

fn keep_last<T>(records: &mut Vec<T>, capacity: usize) {
    if records.len() > capacity {
        records.drain(..records.len() - capacity);
    }
}
