//! HTTP API for the Hermod service.
//!
//! Route modules mirror the resources: subscriptions (CRUD + delivery
//! history), ingest, delivery attempts, health/metrics, and the OpenAPI
//! docs. No caller authentication is performed.

pub mod delivery_attempts;
pub mod health;
pub mod ingest;
pub mod openapi;
pub mod subscriptions;

use crate::cache::SubscriptionCache;
use crate::dal::DAL;
use crate::queue::TaskQueue;
use axum::Router;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Data access layer over the shared pool.
    pub dal: DAL,
    /// Subscription snapshot cache, invalidated on mutations.
    pub cache: SubscriptionCache,
    /// Durable task queue handle.
    pub queue: TaskQueue,
}

/// Creates the full API router.
pub fn configure_api_routes() -> Router<AppState> {
    Router::new()
        .merge(subscriptions::routes())
        .merge(ingest::routes())
        .merge(delivery_attempts::routes())
        .merge(health::routes())
        .merge(openapi::routes())
}
