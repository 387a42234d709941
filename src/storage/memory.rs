use super::{HistoryStore, PredictionRecord};
use crate::error::HistoryError;
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-process history for tests and for running without a history file.
pub struct MemoryHistory {
    records: Mutex<VecDeque<PredictionRecord>>,
    capacity: usize,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, record: PredictionRecord) -> Result<(), HistoryError> {
        let mut w = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        w.push_back(record);
        while w.len() > self.capacity {
            w.pop_front();
        }
        Ok(())
    }

    fn records(&self) -> Result<Vec<PredictionRecord>, HistoryError> {
        let w = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        Ok(w.iter().cloned().collect())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
