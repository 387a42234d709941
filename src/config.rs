//! Service configuration, loaded from a JSON file when present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::DEFAULT_CAPACITY;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LOGINGUARD_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener and optional dashboard files
    pub server: ServerConfig,
    /// Classifier + vocabulary directory
    pub artifacts: ArtifactsConfig,
    /// Prediction history log
    pub history: HistoryConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Served for any path the API does not match
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSON file; `None` keeps history in memory only
    pub path: Option<PathBuf>,
    /// Most recent records kept
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            static_dir: None,
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("data/predictions_history.json")),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ServiceConfig {
    /// Load from JSON file if present; otherwise return default. A file that
    /// exists but does not parse is reported on stderr (logging is not up yet).
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|data| serde_json::from_str::<ServiceConfig>(&data).map_err(|e| e.to_string()))
        {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Path from `--config`, then `LOGINGUARD_CONFIG`, then `loginguard.json`.
    pub fn resolve_path(cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("loginguard.json"))
    }
}
