/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Ingest API module.
//!
//! The entry point of the delivery pipeline: validates the event against
//! the subscription, durably commits the webhook row, then enqueues the
//! first delivery attempt. The row is committed before the enqueue; if the
//! enqueue fails the caller sees 503 and the row stays behind for
//! reconciliation (`requeue-orphans`).

use crate::api::AppState;
use crate::metrics;
use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::Duration;
use hermod_models::models::subscriptions::validate_event_type;
use hermod_models::models::webhooks::NewWebhook;
use hermod_utils::logging::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for ingesting a webhook.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngestRequest {
    /// Type of the event being ingested.
    pub event_type: String,
    /// The webhook payload data; carried opaquely to the receiver.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

/// Acknowledgement returned once the webhook is committed and enqueued.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestResponse {
    /// Identifier of the persisted webhook.
    pub webhook_id: i64,
    /// Always "accepted".
    pub status: String,
}

/// Creates and returns the router for the ingest endpoint.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ingest/:subscription_id", post(ingest_webhook))
}

#[utoipa::path(
    post,
    path = "/ingest/{subscription_id}",
    params(("subscription_id" = i64, Path, description = "Target subscription ID")),
    request_body = IngestRequest,
    responses(
        (status = 202, description = "Webhook accepted for delivery", body = IngestResponse),
        (status = 400, description = "Malformed request"),
        (status = 404, description = "Unknown subscription"),
        (status = 409, description = "Subscription inactive or event type not subscribed"),
        (status = 503, description = "Storage or queue unavailable")
    ),
    tag = "ingest"
)]
/// Accepts an event for delivery to a subscription.
pub(crate) async fn ingest_webhook(
    State(state): State<AppState>,
    Path(subscription_id): Path<i64>,
    Json(request): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), (StatusCode, Json<serde_json::Value>)> {
    validate_event_type(&request.event_type).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e})),
        )
    })?;

    // Ingest validation reads the store directly; the cache serves the
    // delivery hot path, not admission decisions.
    let subscription = match state.dal.subscriptions().get(subscription_id) {
        Ok(Some(subscription)) => subscription,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Subscription not found"})),
            ));
        }
        Err(e) => {
            error!("Failed to fetch subscription {}: {:?}", subscription_id, e);
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "Storage unavailable"})),
            ));
        }
    };

    if !subscription.is_active {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "Subscription is inactive"})),
        ));
    }

    if !subscription.subscribes_to(&request.event_type) {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": format!(
                    "Event type '{}' is not subscribed",
                    request.event_type
                )
            })),
        ));
    }

    let new_webhook = NewWebhook::new(subscription_id, request.event_type, request.payload)
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": e})),
            )
        })?;

    let webhook = match state.dal.webhooks().create(&new_webhook) {
        Ok(webhook) => webhook,
        Err(e) => {
            error!(
                "Failed to persist webhook for subscription {}: {:?}",
                subscription_id, e
            );
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "Storage unavailable"})),
            ));
        }
    };

    // The webhook row is committed; only now is the first attempt enqueued.
    if let Err(e) = state
        .queue
        .enqueue_deliver(webhook.id, 1, Duration::zero())
    {
        error!("Failed to enqueue delivery of webhook {}: {:?}", webhook.id, e);
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "Queue unavailable"})),
        ));
    }

    metrics::WEBHOOKS_INGESTED_TOTAL.inc();
    debug!(
        "Accepted webhook {} for subscription {}",
        webhook.id, subscription_id
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            webhook_id: webhook.id,
            status: "accepted".to_string(),
        }),
    ))
}
