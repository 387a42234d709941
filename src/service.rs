//! Serving context: immutable encoder + scorer, plus the mutable history log.

use crate::artifacts::ModelArtifacts;
use crate::error::Result;
use crate::event::LoginEvent;
use crate::features::FeatureEncoder;
use crate::scoring::{ScoreResult, Scorer};
use crate::storage::{HistoryStore, PredictionRecord, PredictionStats};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Built once at startup and shared by every request handler.
pub struct Detector {
    encoder: FeatureEncoder,
    scorer: Scorer,
    history: Arc<dyn HistoryStore>,
}

impl Detector {
    pub fn new(artifacts: ModelArtifacts, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            encoder: artifacts.encoder,
            scorer: Scorer::new(artifacts.classifier),
            history,
        }
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Serving path for one request body: encode, score, then record it.
    /// A failed history write is logged and does not affect the result.
    pub fn predict(&self, input: &Value) -> Result<ScoreResult> {
        let event = LoginEvent::from_json(input)?;
        let features = self.encoder.encode_one(&event)?;
        let result = self.scorer.score_one(&features)?;
        debug!(
            anomaly = result.anomaly,
            probability_anomaly = result.probability_anomaly,
            "login scored"
        );

        if let Err(e) = self
            .history
            .append(PredictionRecord::new(input.clone(), result))
        {
            warn!(error = %e, "failed to persist prediction history");
        }
        Ok(result)
    }

    /// Offline path: same encoding, no history.
    pub fn predict_batch(&self, events: &[LoginEvent]) -> Result<Vec<ScoreResult>> {
        let table = self.encoder.encode(events)?;
        Ok(self.scorer.score(&table)?)
    }

    /// Stored records; an unreadable log reads as empty.
    pub fn history(&self) -> Vec<PredictionRecord> {
        self.history.records().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load prediction history");
            Vec::new()
        })
    }

    pub fn stats(&self) -> PredictionStats {
        PredictionStats::from_records(&self.history())
    }
}
