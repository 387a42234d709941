//! loginguard — login anomaly classifier service.
//!
//! Modular structure:
//! - [`event`] — Raw login events (JSON / CSV)
//! - [`features`] — Fixed-order feature encoding and category vocabularies
//! - [`model`] — Binary classifiers (decision forest, optional ONNX)
//! - [`artifacts`] — Load-once classifier + vocabularies with checksum manifest
//! - [`scoring`] — Label + class probabilities per record
//! - [`storage`] — Capped prediction history and dashboard stats
//! - [`service`] — Serving context tying the above together
//! - [`batch`] — Offline CSV/JSON prediction and training-table export
//! - [`api`] — HTTP routes
//! - [`logging`] — Structured logging

pub mod api;
pub mod artifacts;
pub mod batch;
pub mod config;
pub mod error;
pub mod event;
pub mod features;
pub mod logging;
pub mod model;
pub mod scoring;
pub mod service;
pub mod storage;

pub use artifacts::ModelArtifacts;
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use event::LoginEvent;
pub use features::{CategoryVocabulary, FeatureEncoder, FeatureTable, FeatureVector};
pub use logging::StructuredLogger;
pub use scoring::{ScoreResult, Scorer};
pub use service::Detector;

use config::HistoryConfig;
use std::sync::Arc;
use storage::{HistoryStore, JsonFileHistory, MemoryHistory};

/// History store for the configured path (in-memory when no path is set).
pub fn open_history(config: &HistoryConfig) -> Arc<dyn HistoryStore> {
    match &config.path {
        Some(path) => Arc::new(JsonFileHistory::new(path.clone(), config.capacity)),
        None => Arc::new(MemoryHistory::new(config.capacity)),
    }
}

/// Load artifacts and serve the HTTP API until Ctrl+C.
/// Missing or invalid artifacts fail here, before the listener is bound.
pub async fn serve(config: &ServiceConfig) -> anyhow::Result<()> {
    let artifacts = ModelArtifacts::load(&config.artifacts.dir).map_err(Error::from)?;
    let detector = Detector::new(artifacts, open_history(&config.history));
    let app = api::router(api::state::AppState::new(detector), config.server.static_dir.as_deref());

    let addr: std::net::SocketAddr = config.server.bind.parse()?;
    tracing::info!(%addr, history = ?config.history.path, "loginguard listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    Ok(())
}
