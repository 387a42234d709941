//! Decision-forest classifier evaluated from exported node arrays.
//!
//! Artifact format (`classifier.json`):
//!
//! ```json
//! {
//!   "n_features": 14,
//!   "classes": [0, 1],
//!   "trees": [
//!     {
//!       "children_left":  [1, -1, -1],
//!       "children_right": [2, -1, -1],
//!       "feature":        [6, -2, -2],
//!       "threshold":      [500000.0, -2.0, -2.0],
//!       "value":          [[80.0, 20.0], [75.0, 5.0], [5.0, 15.0]]
//!     }
//!   ]
//! }
//! ```
//!
//! These are the node arrays of a fitted tree ensemble. `-1` marks a leaf; leaf
//! `value`s are per-class weights, normalized per tree and averaged over trees.

use super::{check_columns, Classifier, ANOMALY, NORMAL};
use crate::error::{ArtifactError, ModelError};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("node arrays differ in length".to_string());
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            let weights = &self.value[node];
            if weights.len() != n_classes || weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(format!("node {} has malformed class weights", node));
            }
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has exactly one child", node));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has zero weight", node));
                }
                continue;
            }
            // children always come after their parent, which also rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} points at invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }
        Ok(())
    }

    fn leaf_for(&self, row: ArrayView1<f64>) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            // splits were learned on f32 inputs
            let x = row[f] as f32 as f64;
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    fn proba(&self, row: ArrayView1<f64>) -> [f64; 2] {
        let leaf = &self.value[self.leaf_for(row)];
        let total: f64 = leaf.iter().sum();
        [leaf[NORMAL] / total, leaf[ANOMALY] / total]
    }
}

/// On-disk shape of `classifier.json`, before validation.
#[derive(Debug, Clone, Deserialize)]
struct ForestFile {
    n_features: usize,
    classes: Vec<u8>,
    trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForestFile")]
pub struct ForestClassifier {
    n_features: usize,
    classes: Vec<u8>,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Result<Self, ModelError> {
        let forest = Self {
            n_features,
            classes: vec![0, 1],
            trees,
        };
        forest.validate().map_err(ModelError::Malformed)?;
        Ok(forest)
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Missing {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ForestFile = serde_json::from_str(&data).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let forest = Self::try_from(file).map_err(|reason| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::info!(path = %path.display(), trees = forest.trees.len(), "decision forest loaded");
        Ok(forest)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn validate(&self) -> Result<(), String> {
        if self.classes != [0, 1] {
            return Err(format!("expected classes [0, 1], got {:?}", self.classes));
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    fn proba_row(&self, row: ArrayView1<f64>) -> [f64; 2] {
        let mut acc = [0.0f64; 2];
        for tree in &self.trees {
            let p = tree.proba(row);
            acc[NORMAL] += p[NORMAL];
            acc[ANOMALY] += p[ANOMALY];
        }
        let n = self.trees.len() as f64;
        [acc[NORMAL] / n, acc[ANOMALY] / n]
    }
}

impl TryFrom<ForestFile> for ForestClassifier {
    type Error = String;

    fn try_from(file: ForestFile) -> Result<Self, Self::Error> {
        let forest = Self {
            n_features: file.n_features,
            classes: file.classes,
            trees: file.trees,
        };
        forest.validate()?;
        Ok(forest)
    }
}

impl Classifier for ForestClassifier {
    fn name(&self) -> &str {
        "decision_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    /// Argmax of the averaged probabilities; a tie goes to the first class (normal).
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>, ModelError> {
        check_columns(x, self.n_features)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let p = self.proba_row(row);
                if p[ANOMALY] > p[NORMAL] {
                    self.classes[ANOMALY]
                } else {
                    self.classes[NORMAL]
                }
            })
            .collect())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        check_columns(x, self.n_features)?;
        let mut out = Array2::<f64>::zeros((x.nrows(), 2));
        for (i, row) in x.rows().into_iter().enumerate() {
            let p = self.proba_row(row);
            out[[i, NORMAL]] = p[NORMAL];
            out[[i, ANOMALY]] = p[ANOMALY];
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: i64, threshold: f64, left: [f64; 2], right: [f64; 2]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![vec![left[0] + right[0], left[1] + right[1]], left.to_vec(), right.to_vec()],
        }
    }

    #[test]
    fn averages_trees() {
        let forest = ForestClassifier::new(
            2,
            vec![
                stump(0, 0.5, [9.0, 1.0], [1.0, 9.0]),
                stump(1, 0.5, [10.0, 0.0], [0.0, 10.0]),
            ],
        )
        .unwrap();
        let x = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let p = forest.predict_proba(&x).unwrap();
        assert!((p[[0, ANOMALY]] - 0.05).abs() < 1e-12);
        assert!((p[[1, ANOMALY]] - 0.45).abs() < 1e-12);
        assert!((p[[2, ANOMALY]] - 0.95).abs() < 1e-12);
        assert_eq!(forest.predict(&x).unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn tie_is_normal() {
        let forest = ForestClassifier::new(1, vec![stump(0, 0.5, [5.0, 5.0], [5.0, 5.0])]).unwrap();
        assert_eq!(forest.predict(&array![[0.0]]).unwrap(), vec![0]);
    }

    #[test]
    fn wrong_width_rejected() {
        let forest = ForestClassifier::new(2, vec![stump(0, 0.5, [1.0, 0.0], [0.0, 1.0])]).unwrap();
        let err = forest.predict(&array![[0.0, 1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, ModelError::FeatureCount { expected: 2, got: 3 }));
    }

    #[test]
    fn backward_child_rejected() {
        let mut tree = stump(0, 0.5, [1.0, 0.0], [0.0, 1.0]);
        tree.children_left[0] = 0;
        assert!(ForestClassifier::new(1, vec![tree]).is_err());
    }

    #[test]
    fn deserialize_validates_nodes() {
        let good = ForestClassifier::new(2, vec![stump(1, 0.5, [1.0, 0.0], [0.0, 1.0])]).unwrap();
        let mut json = serde_json::to_value(&good).unwrap();
        let back: ForestClassifier = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, good);

        json["trees"][0]["children_left"] = serde_json::json!([7, -1, -1]);
        assert!(serde_json::from_value::<ForestClassifier>(json.clone()).is_err());
        json["trees"] = serde_json::json!([]);
        assert!(serde_json::from_value::<ForestClassifier>(json).is_err());
    }

    #[test]
    fn split_on_unknown_feature_rejected() {
        let tree = stump(3, 0.5, [1.0, 0.0], [0.0, 1.0]);
        assert!(ForestClassifier::new(2, vec![tree]).is_err());
    }
}
