//! Error taxonomy: bad input, artifact loading, model evaluation and history persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Raised while turning a raw login record into a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Field is present and typed correctly but its value cannot be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Field is missing or has the wrong JSON type.
    #[error("schema error: field `{field}` {reason}")]
    Schema { field: &'static str, reason: String },
    /// Batch wrapper pointing at the offending record (0-based).
    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    pub fn missing(field: &'static str) -> Self {
        EncodeError::Schema {
            field,
            reason: "is required".to_string(),
        }
    }

    pub fn wrong_type(field: &'static str, expected: &str) -> Self {
        EncodeError::Schema {
            field,
            reason: format!("must be {}", expected),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model expects {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("classifier returned {got} rows for {expected} inputs")]
    RowCount { expected: usize, got: usize },
    #[error("malformed model: {0}")]
    Malformed(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Fatal at startup: the service must not serve without its artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {} not found", .path.display())]
    Missing { path: PathBuf },
    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact {} is invalid: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
    #[error("checksum mismatch for {}: manifest {expected}, file {actual}", .path.display())]
    Checksum {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("history lock poisoned")]
    Poisoned,
}

/// Crate-level error for callers that cross several concerns (CLI, service setup).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("artifact load failed: {0}")]
    ArtifactLoad(#[from] ArtifactError),
    #[error(transparent)]
    History(#[from] HistoryError),
    /// Batch files (CSV / JSON) that cannot be read or written.
    #[error("{}: {reason}", .path.display())]
    Batch { path: PathBuf, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
