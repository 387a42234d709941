//! Combines the classifier's label and class probabilities into per-record results.

use crate::error::ModelError;
use crate::features::{FeatureTable, FeatureVector};
use crate::model::{Classifier, ANOMALY, NORMAL};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result for a single login; also the `prediction` object stored in history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub anomaly: u8,
    pub probability_normal: f64,
    pub probability_anomaly: f64,
}

impl ScoreResult {
    pub fn is_anomaly(&self) -> bool {
        self.anomaly == 1
    }
}

#[derive(Clone)]
pub struct Scorer {
    classifier: Arc<dyn Classifier>,
}

impl Scorer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Label comes from `predict`, probabilities from `predict_proba`; the label is
    /// never re-derived from a probability cutoff.
    pub fn score(&self, table: &FeatureTable) -> Result<Vec<ScoreResult>, ModelError> {
        if table.is_empty() {
            return Ok(Vec::new());
        }
        let x = table.to_matrix();
        let labels = self.classifier.predict(&x)?;
        let proba = self.classifier.predict_proba(&x)?;

        if labels.len() != table.len() {
            return Err(ModelError::RowCount {
                expected: table.len(),
                got: labels.len(),
            });
        }
        if proba.nrows() != table.len() {
            return Err(ModelError::RowCount {
                expected: table.len(),
                got: proba.nrows(),
            });
        }
        if proba.ncols() != 2 {
            return Err(ModelError::Malformed(format!(
                "expected 2 probability columns, got {}",
                proba.ncols()
            )));
        }

        labels
            .into_iter()
            .zip(proba.rows())
            .map(|(label, p)| {
                if label > 1 {
                    return Err(ModelError::Malformed(format!("unexpected label {}", label)));
                }
                Ok(ScoreResult {
                    anomaly: label,
                    probability_normal: p[NORMAL],
                    probability_anomaly: p[ANOMALY],
                })
            })
            .collect()
    }

    pub fn score_one(&self, fv: &FeatureVector) -> Result<ScoreResult, ModelError> {
        let mut results = self.score(&FeatureTable::new(vec![*fv]))?;
        results.pop().ok_or(ModelError::RowCount {
            expected: 1,
            got: 0,
        })
    }
}
