/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! OpenAPI documentation for the Hermod API.

use crate::api::ingest::{IngestRequest, IngestResponse};
use crate::api::subscriptions::{CreateSubscriptionRequest, UpdateSubscriptionRequest};
use crate::api::{delivery_attempts, health, ingest, subscriptions, AppState};
use axum::Router;
use hermod_models::models::delivery_attempts::DeliveryAttempt;
use hermod_models::models::subscriptions::Subscription;
use hermod_models::models::webhooks::Webhook;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        subscriptions::create_subscription,
        subscriptions::list_subscriptions,
        subscriptions::get_subscription,
        subscriptions::update_subscription,
        subscriptions::delete_subscription,
        subscriptions::list_delivery_attempts,
        ingest::ingest_webhook,
        delivery_attempts::get_delivery_attempt,
        health::health_check,
    ),
    components(schemas(
        Subscription,
        Webhook,
        DeliveryAttempt,
        CreateSubscriptionRequest,
        UpdateSubscriptionRequest,
        IngestRequest,
        IngestResponse,
    )),
    tags(
        (name = "subscriptions", description = "Subscription management"),
        (name = "ingest", description = "Webhook ingestion"),
        (name = "delivery-attempts", description = "Delivery history"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Hermod Webhook Delivery Service",
        description = "Accepts event payloads for registered subscriptions and delivers them as signed HTTP POSTs with bounded retries."
    )
)]
pub struct ApiDoc;

/// Creates the swagger-ui router serving the generated document.
pub fn routes() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
