/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Webhook models.
//!
//! A webhook is one ingested event bound to a subscription. Rows are created
//! exactly once by the ingest endpoint, never mutated, and removed only by
//! cascade when their subscription is deleted. Delivery state is derived
//! from the associated delivery attempts, not stored here.

use crate::models::subscriptions::validate_event_type;
use crate::schema::webhooks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An ingested webhook record from the database.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Webhook {
    /// Unique identifier for the webhook.
    pub id: i64,
    /// The subscription this webhook is addressed to.
    pub subscription_id: i64,
    /// Event type, a member of the subscription's set at ingest time.
    pub event_type: String,
    /// Opaque JSON payload. Only canonically serialized, never inspected.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// When the webhook was ingested.
    pub created_at: DateTime<Utc>,
}

/// A new webhook to be inserted.
#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = webhooks)]
pub struct NewWebhook {
    /// The subscription this webhook is addressed to.
    pub subscription_id: i64,
    /// Event type.
    pub event_type: String,
    /// Opaque JSON payload.
    pub payload: serde_json::Value,
}

impl NewWebhook {
    /// Creates a new webhook after validating the event type.
    pub fn new(
        subscription_id: i64,
        event_type: String,
        payload: serde_json::Value,
    ) -> Result<Self, String> {
        validate_event_type(&event_type)?;

        Ok(Self {
            subscription_id,
            event_type,
            payload,
        })
    }
}
