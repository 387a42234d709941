//! History persisted as one pretty-printed JSON array.
//!
//! Appends are guarded by an in-process mutex and land via temp file + rename.
//! Two processes sharing the same file can still lose each other's appends.

use super::{keep_last, HistoryStore, PredictionRecord};
use crate::error::HistoryError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct JsonFileHistory {
    path: PathBuf,
    capacity: usize,
    lock: Mutex<()>,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<Vec<PredictionRecord>, HistoryError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io(e)),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|source| HistoryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, records: &[PredictionRecord]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        let data = serde_json::to_string_pretty(records).map_err(|source| HistoryError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, data).map_err(|e| self.io(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io(e))
    }
}

impl HistoryStore for JsonFileHistory {
    /// A corrupt file is reported, never overwritten.
    fn append(&self, record: PredictionRecord) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;
        let mut records = self.read_all()?;
        records.push(record);
        keep_last(&mut records, self.capacity);
        self.write_all(&records)
    }

    fn records(&self) -> Result<Vec<PredictionRecord>, HistoryError> {
        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;
        let mut records = self.read_all()?;
        keep_last(&mut records, self.capacity);
        Ok(records)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
