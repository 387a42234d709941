//! Route handlers. Detector calls touch the history file, so they run on the
//! blocking pool.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::error::{AppError, AppResult};
use super::state::AppState;
use crate::scoring::ScoreResult;
use crate::storage::{PredictionRecord, PredictionStats};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ScoreResult>> {
    let Json(input) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let detector = state.detector.clone();
    let result = tokio::task::spawn_blocking(move || detector.predict(&input)).await??;
    Ok(Json(result))
}

pub async fn history(State(state): State<AppState>) -> AppResult<Json<Vec<PredictionRecord>>> {
    let detector = state.detector.clone();
    let records = tokio::task::spawn_blocking(move || detector.history()).await?;
    Ok(Json(records))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<PredictionStats>> {
    let detector = state.detector.clone();
    let stats = tokio::task::spawn_blocking(move || detector.stats()).await?;
    Ok(Json(stats))
}
