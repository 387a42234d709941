//! Binary login classifiers behind a two-call contract: discrete labels and
//! per-class probabilities, each computed by the model itself.

mod forest;
#[cfg(feature = "onnx")]
mod onnx;

pub use forest::{DecisionTree, ForestClassifier};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

use crate::error::ModelError;
use ndarray::Array2;

/// Class index of "normal" in probability rows.
pub const NORMAL: usize = 0;
/// Class index of "anomaly" in probability rows.
pub const ANOMALY: usize = 1;

pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Number of input columns the model was fit on.
    fn n_features(&self) -> usize;

    /// Labels (0 = normal, 1 = anomaly) using the model's own decision rule.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>, ModelError>;

    /// `[n_rows, 2]` probabilities, columns ordered `[NORMAL, ANOMALY]`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError>;
}

pub(crate) fn check_columns(x: &Array2<f64>, expected: usize) -> Result<(), ModelError> {
    if x.ncols() != expected {
        return Err(ModelError::FeatureCount {
            expected,
            got: x.ncols(),
        });
    }
    Ok(())
}
