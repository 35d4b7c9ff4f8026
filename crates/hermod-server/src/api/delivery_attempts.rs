/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Delivery attempts API module.
//!
//! Read-only lookups over the recorded attempt history. The per-subscription
//! listing lives under the subscriptions router.

use crate::api::AppState;
use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use hermod_models::models::delivery_attempts::DeliveryAttempt;
use hermod_utils::logging::prelude::*;

/// Creates and returns the router for delivery attempt endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/delivery-attempts/:id", get(get_delivery_attempt))
}

#[utoipa::path(
    get,
    path = "/delivery-attempts/{id}",
    params(("id" = i64, Path, description = "Delivery attempt ID")),
    responses(
        (status = 200, description = "Delivery attempt found", body = DeliveryAttempt),
        (status = 404, description = "Delivery attempt not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "delivery-attempts"
)]
/// Retrieves a delivery attempt by ID.
pub(crate) async fn get_delivery_attempt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeliveryAttempt>, (StatusCode, Json<serde_json::Value>)> {
    match state.dal.delivery_attempts().get(id) {
        Ok(Some(attempt)) => Ok(Json(attempt)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Delivery attempt not found"})),
        )),
        Err(e) => {
            error!("Failed to fetch delivery attempt {}: {:?}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch delivery attempt"})),
            ))
        }
    }
}
