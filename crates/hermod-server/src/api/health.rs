/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Health and metrics endpoints.

use crate::api::AppState;
use crate::metrics;
use axum::{routing::get, Json, Router};

/// Creates and returns the router for health endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(serve_metrics))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy")),
    tag = "health"
)]
/// Reports service health.
pub(crate) async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}

/// Serves Prometheus metrics in text format.
async fn serve_metrics() -> String {
    metrics::gather()
}
