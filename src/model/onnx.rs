//! ONNX Runtime classifier. Input: `[n, 14]` f32. Outputs: labels (int64, `[n]`)
//! then probabilities (f32, `[n, 2]`), as produced by a tree-ensemble ONNX export.

use super::{check_columns, Classifier};
use crate::error::{ArtifactError, ModelError};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    proba_output: String,
    n_features: usize,
}

impl OnnxClassifier {
    pub fn load(path: &Path, n_features: usize) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Missing {
                path: path.to_path_buf(),
            });
        }
        let invalid = |e: ort::Error| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let session = Session::builder()
            .map_err(invalid)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(invalid)?
            .commit_from_file(path)
            .map_err(invalid)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());
        let (label_output, proba_output) = match session.outputs.as_slice() {
            [label, proba, ..] => (label.name.clone(), proba.name.clone()),
            _ => {
                return Err(ArtifactError::Invalid {
                    path: path.to_path_buf(),
                    reason: "expected label and probability outputs".to_string(),
                })
            }
        };
        tracing::info!(path = %path.display(), %input_name, "ONNX classifier loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            label_output,
            proba_output,
            n_features,
        })
    }

    fn run<T, F>(&self, x: &Array2<f64>, extract: F) -> Result<T, ModelError>
    where
        F: FnOnce(&ort::session::SessionOutputs) -> Result<T, ModelError>,
    {
        check_columns(x, self.n_features)?;
        let input = Tensor::from_array(x.mapv(|v| v as f32)).map_err(inference)?;
        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(inference)?;
        extract(&outputs)
    }
}

fn inference(e: ort::Error) -> ModelError {
    ModelError::Inference(e.to_string())
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>, ModelError> {
        self.run(x, |outputs| {
            let value = outputs
                .get(self.label_output.as_str())
                .ok_or_else(|| ModelError::Inference("missing label output".to_string()))?;
            let (_, labels) = value.try_extract_tensor::<i64>().map_err(inference)?;
            labels
                .iter()
                .map(|&l| match l {
                    0 | 1 => Ok(l as u8),
                    other => Err(ModelError::Malformed(format!("unexpected label {}", other))),
                })
                .collect()
        })
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let rows = x.nrows();
        self.run(x, |outputs| {
            let value = outputs
                .get(self.proba_output.as_str())
                .ok_or_else(|| ModelError::Inference("missing probability output".to_string()))?;
            let (_, probs) = value.try_extract_tensor::<f32>().map_err(inference)?;
            let data: Vec<f64> = probs.iter().map(|&p| p as f64).collect();
            Array2::from_shape_vec((rows, 2), data)
                .map_err(|e| ModelError::Malformed(format!("probability tensor: {}", e)))
        })
    }
}
