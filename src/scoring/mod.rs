//! Scoring: feature table + classifier → label and class probabilities.

mod engine;

pub use engine::{ScoreResult, Scorer};
