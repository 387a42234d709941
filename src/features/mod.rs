//! Login event → fixed-order numeric feature vector.
//!
//! The column order in [`FEATURE_LAYOUT`] is the contract with the trained
//! classifier: it has no schema check of its own, so a reordered vector scores
//! as nonsense instead of failing.

mod pipeline;
mod timestamp;
mod vocabulary;

pub use pipeline::{FeatureEncoder, PLACEHOLDER_FREQUENCY};
pub use timestamp::{login_time, parse_timestamp, LoginTime};
pub use vocabulary::{CategoryVocabulary, UNKNOWN_CODE};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Feature names in the exact order the classifier was fit on.
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "login_hour",
    "login_day",
    "login_month",
    "login_year",
    "login_weekday",
    "is_new_device",
    "bytes_in",
    "bytes_out",
    "success",
    "geo_location_encoded",
    "device_id_encoded",
    "user_login_frequency",
    "device_login_frequency",
    "location_login_frequency",
];

pub const FEATURE_COUNT: usize = 14;

/// One encoded login. Field declaration order matches [`FEATURE_LAYOUT`], so the
/// serde/CSV header order is the model column order too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub login_hour: i64,
    pub login_day: i64,
    pub login_month: i64,
    pub login_year: i64,
    pub login_weekday: i64,
    pub is_new_device: i64,
    pub bytes_in: i64,
    pub bytes_out: i64,
    pub success: i64,
    pub geo_location_encoded: i64,
    pub device_id_encoded: i64,
    pub user_login_frequency: i64,
    pub device_login_frequency: i64,
    pub location_login_frequency: i64,
}

impl FeatureVector {
    pub fn values(&self) -> [i64; FEATURE_COUNT] {
        [
            self.login_hour,
            self.login_day,
            self.login_month,
            self.login_year,
            self.login_weekday,
            self.is_new_device,
            self.bytes_in,
            self.bytes_out,
            self.success,
            self.geo_location_encoded,
            self.device_id_encoded,
            self.user_login_frequency,
            self.device_login_frequency,
            self.location_login_frequency,
        ]
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        self.values().map(|v| v as f64)
    }
}

/// Encoded batch, one row per input record in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dense `[n_rows, FEATURE_COUNT]` matrix for the classifier.
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut m = Array2::<f64>::zeros((self.rows.len(), FEATURE_COUNT));
        for (mut row, fv) in m.rows_mut().into_iter().zip(&self.rows) {
            for (cell, v) in row.iter_mut().zip(fv.to_array()) {
                *cell = v;
            }
        }
        m
    }
}

impl From<Vec<FeatureVector>> for FeatureTable {
    fn from(rows: Vec<FeatureVector>) -> Self {
        Self::new(rows)
    }
}

impl IntoIterator for FeatureTable {
    type Item = FeatureVector;
    type IntoIter = std::vec::IntoIter<FeatureVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
