//! Forecast API Service Library
//!
//! HTTP boundary over the extraction engine: `GET /forecast?lon=..&lat=..`
//! returns the point forecast series as JSON.

pub mod config;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router around shared state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forecast", get(handlers::forecast::forecast_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
