//! Load-once serving artifacts: classifier and the two category vocabularies,
//! optionally pinned by a SHA-256 manifest.

use crate::error::ArtifactError;
use crate::features::{CategoryVocabulary, FeatureEncoder, FEATURE_COUNT};
use crate::model::{Classifier, ForestClassifier};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub const CLASSIFIER_JSON: &str = "classifier.json";
pub const CLASSIFIER_ONNX: &str = "classifier.onnx";
pub const GEO_VOCAB: &str = "geo_vocab.json";
pub const DEVICE_VOCAB: &str = "device_vocab.json";
pub const MANIFEST: &str = "manifest.json";

/// `manifest.json`: file name (relative to the artifact dir) → lowercase hex SHA-256.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

pub struct ModelArtifacts {
    pub encoder: FeatureEncoder,
    pub classifier: Arc<dyn Classifier>,
}

impl ModelArtifacts {
    pub fn new(encoder: FeatureEncoder, classifier: Arc<dyn Classifier>) -> Self {
        Self { encoder, classifier }
    }

    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        verify_manifest(dir)?;

        let geo = CategoryVocabulary::load(&dir.join(GEO_VOCAB))?;
        let device = CategoryVocabulary::load(&dir.join(DEVICE_VOCAB))?;
        let classifier = load_classifier(dir)?;
        if classifier.n_features() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid {
                path: dir.to_path_buf(),
                reason: format!(
                    "classifier expects {} features, encoder produces {}",
                    classifier.n_features(),
                    FEATURE_COUNT
                ),
            });
        }

        tracing::info!(
            dir = %dir.display(),
            classifier = classifier.name(),
            geo_classes = geo.len(),
            device_classes = device.len(),
            "artifacts loaded"
        );
        Ok(Self {
            encoder: FeatureEncoder::new(geo, device),
            classifier,
        })
    }
}

#[cfg(feature = "onnx")]
fn load_classifier(dir: &Path) -> Result<Arc<dyn Classifier>, ArtifactError> {
    let onnx = dir.join(CLASSIFIER_ONNX);
    if onnx.exists() {
        return Ok(Arc::new(crate::model::OnnxClassifier::load(&onnx, FEATURE_COUNT)?));
    }
    Ok(Arc::new(ForestClassifier::load(&dir.join(CLASSIFIER_JSON))?))
}

#[cfg(not(feature = "onnx"))]
fn load_classifier(dir: &Path) -> Result<Arc<dyn Classifier>, ArtifactError> {
    let json = dir.join(CLASSIFIER_JSON);
    let onnx = dir.join(CLASSIFIER_ONNX);
    if !json.exists() && onnx.exists() {
        return Err(ArtifactError::Invalid {
            path: onnx,
            reason: "built without the `onnx` feature".to_string(),
        });
    }
    Ok(Arc::new(ForestClassifier::load(&json)?))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn verify_manifest(dir: &Path) -> Result<(), ArtifactError> {
    let path = dir.join(MANIFEST);
    if !path.exists() {
        return Ok(());
    }
    let data = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;
    let manifest: Manifest =
        serde_json::from_str(&data).map_err(|source| ArtifactError::Parse { path, source })?;

    for (name, expected) in &manifest.files {
        let file = dir.join(name);
        if !file.exists() {
            return Err(ArtifactError::Missing { path: file });
        }
        let bytes = std::fs::read(&file).map_err(|source| ArtifactError::Io {
            path: file.clone(),
            source,
        })?;
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::Checksum {
                path: file,
                expected: expected.clone(),
                actual,
            });
        }
    }
    tracing::debug!(files = manifest.files.len(), "artifact manifest verified");
    Ok(())
}
