//! API layer -- axum routes, handlers, and middleware.

mod error;
mod routes;
pub mod state;

pub use error::{AppError, AppResult};

use self::state::AppState;
use axum::{
    routing::{get, get_service, post},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Dashboard pages served from `static_dir`: route → file name.
pub const PAGES: [(&str, &str); 4] = [
    ("/", "frontend.html"),
    ("/dashboard", "dashboard.html"),
    ("/api-docs", "api_docs.html"),
    ("/predict", "predict.html"),
];

/// Build the application router. When `static_dir` is given, the dashboard
/// pages are routed by name and any other unmatched path is served from it.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut predict = post(routes::predict);
    let mut app = Router::new()
        .route("/health", get(routes::health))
        .route("/predictions/history", get(routes::history))
        .route("/predictions/stats", get(routes::stats));

    if let Some(dir) = static_dir {
        for (route, file) in PAGES {
            let page = ServeFile::new(dir.join(file));
            if route == "/predict" {
                predict = predict.get_service(page);
            } else {
                app = app.route(route, get_service(page));
            }
        }
    }
    app = app.route("/predict", predict);

    app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(fallback),
    };

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn fallback() -> AppError {
    AppError::NotFound
}
