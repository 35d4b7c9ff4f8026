/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Subscriptions API module.
//!
//! This module provides routes and handlers for managing subscriptions,
//! including CRUD operations and delivery history inspection. Mutations
//! invalidate the subscription cache so workers see changes promptly.

use crate::api::AppState;
use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use hermod_models::models::delivery_attempts::DeliveryAttempt;
use hermod_models::models::subscriptions::{NewSubscription, Subscription, UpdateSubscription};
use hermod_utils::logging::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

/// Default page size for delivery attempt listings.
const DEFAULT_ATTEMPTS_LIMIT: i64 = 50;
/// Maximum page size for delivery attempt listings.
const MAX_ATTEMPTS_LIMIT: i64 = 100;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request body for creating a subscription.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    /// The URL where webhooks will be delivered.
    pub target_url: String,
    /// Secret key for webhook signature verification (8..=64 chars).
    pub secret: String,
    /// Event types to subscribe to (at least one).
    pub event_types: Vec<String>,
}

/// Request body for updating a subscription.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    /// New target URL.
    #[serde(default)]
    pub target_url: Option<String>,
    /// New signing secret.
    #[serde(default)]
    pub secret: Option<String>,
    /// New event type set.
    #[serde(default)]
    pub event_types: Option<Vec<String>>,
    /// Activate or deactivate the subscription.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Query parameters for listing delivery attempts.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ListAttemptsQuery {
    /// Maximum number of results (default 50, max 100).
    #[serde(default)]
    pub limit: Option<i64>,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: Option<i64>,
}

// =============================================================================
// Routes
// =============================================================================

/// Creates and returns the router for subscription endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions", post(create_subscription))
        .route("/subscriptions/:id", get(get_subscription))
        .route("/subscriptions/:id", put(update_subscription))
        .route("/subscriptions/:id", delete(delete_subscription))
        .route(
            "/subscriptions/:id/delivery-attempts",
            get(list_delivery_attempts),
        )
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    post,
    path = "/subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = Subscription),
        (status = 400, description = "Invalid request data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "subscriptions"
)]
/// Creates a new subscription.
pub(crate) async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<Subscription>), (StatusCode, Json<serde_json::Value>)> {
    let new_subscription =
        NewSubscription::new(request.target_url, request.secret, request.event_types).map_err(
            |e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": e})),
                )
            },
        )?;

    match state.dal.subscriptions().create(&new_subscription) {
        Ok(subscription) => {
            info!("Created subscription {}", subscription.id);
            Ok((StatusCode::CREATED, Json(subscription)))
        }
        Err(e) => {
            error!("Failed to create subscription: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to create subscription"})),
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    responses(
        (status = 200, description = "List all subscriptions", body = Vec<Subscription>),
        (status = 500, description = "Internal server error")
    ),
    tag = "subscriptions"
)]
/// Lists all subscriptions.
pub(crate) async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, (StatusCode, Json<serde_json::Value>)> {
    match state.dal.subscriptions().list(false) {
        Ok(subscriptions) => Ok(Json(subscriptions)),
        Err(e) => {
            error!("Failed to list subscriptions: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to list subscriptions"})),
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    params(("id" = i64, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "subscriptions"
)]
/// Retrieves a subscription by ID.
pub(crate) async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>, (StatusCode, Json<serde_json::Value>)> {
    match state.dal.subscriptions().get(id) {
        Ok(Some(subscription)) => Ok(Json(subscription)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Subscription not found"})),
        )),
        Err(e) => {
            error!("Failed to fetch subscription {}: {:?}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch subscription"})),
            ))
        }
    }
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    params(("id" = i64, Path, description = "Subscription ID")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = Subscription),
        (status = 400, description = "Invalid request data"),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "subscriptions"
)]
/// Updates a subscription and invalidates its cache entry.
pub(crate) async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateSubscriptionRequest>,
) -> Result<Json<Subscription>, (StatusCode, Json<serde_json::Value>)> {
    match state.dal.subscriptions().get(id) {
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Subscription not found"})),
            ));
        }
        Err(e) => {
            error!("Failed to fetch subscription {}: {:?}", id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch subscription"})),
            ));
        }
        Ok(Some(_)) => {}
    }

    let changeset = UpdateSubscription::new(
        request.target_url,
        request.secret,
        request.event_types,
        request.is_active,
    )
    .map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e})),
        )
    })?;

    match state.dal.subscriptions().update(id, &changeset) {
        Ok(subscription) => {
            state.cache.invalidate(id).await;
            info!("Updated subscription {}", id);
            Ok(Json(subscription))
        }
        Err(e) => {
            error!("Failed to update subscription {}: {:?}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to update subscription"})),
            ))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    params(("id" = i64, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "subscriptions"
)]
/// Deletes a subscription; webhooks and attempts cascade.
pub(crate) async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<serde_json::Value>)> {
    match state.dal.subscriptions().delete(id) {
        Ok(count) if count > 0 => {
            state.cache.invalidate(id).await;
            info!("Deleted subscription {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(_) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Subscription not found"})),
        )),
        Err(e) => {
            error!("Failed to delete subscription {}: {:?}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to delete subscription"})),
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}/delivery-attempts",
    params(
        ("id" = i64, Path, description = "Subscription ID"),
        ("limit" = Option<i64>, Query, description = "Maximum number of results"),
        ("offset" = Option<i64>, Query, description = "Offset for pagination")
    ),
    responses(
        (status = 200, description = "Delivery attempts for the subscription", body = Vec<DeliveryAttempt>),
        (status = 404, description = "Subscription not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "delivery-attempts"
)]
/// Lists delivery attempts for a subscription, newest first.
pub(crate) async fn list_delivery_attempts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListAttemptsQuery>,
) -> Result<Json<Vec<DeliveryAttempt>>, (StatusCode, Json<serde_json::Value>)> {
    match state.dal.subscriptions().get(id) {
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Subscription not found"})),
            ));
        }
        Err(e) => {
            error!("Failed to fetch subscription {}: {:?}", id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to fetch subscription"})),
            ));
        }
        Ok(Some(_)) => {}
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_ATTEMPTS_LIMIT)
        .clamp(1, MAX_ATTEMPTS_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    match state
        .dal
        .delivery_attempts()
        .list_for_subscription(id, limit, offset)
    {
        Ok(attempts) => Ok(Json(attempts)),
        Err(e) => {
            error!("Failed to list attempts for subscription {}: {:?}", id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to list delivery attempts"})),
            ))
        }
    }
}
