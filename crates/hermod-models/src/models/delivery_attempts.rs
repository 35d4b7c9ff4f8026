/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Delivery attempt models.
//!
//! One row per outbound HTTP call. Attempts for a webhook form a gapless
//! 1-based chain enforced by the `(webhook_id, attempt_number)` uniqueness
//! constraint; a webhook's terminal state (delivered, rejected, exhausted)
//! is derived from its attempt rows.

use crate::schema::delivery_attempts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A delivery attempt record from the database.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = delivery_attempts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryAttempt {
    /// Unique identifier for the attempt.
    pub id: i64,
    /// The subscription delivered to.
    pub subscription_id: i64,
    /// The webhook being delivered.
    pub webhook_id: i64,
    /// 1-based index within the webhook's retry chain.
    pub attempt_number: i32,
    /// HTTP status code, or null when no response was received.
    pub status_code: Option<i32>,
    /// Bounded prefix of the response body.
    pub response_body: Option<String>,
    /// Short error description when the call failed without a usable response.
    pub error_message: Option<String>,
    /// True iff `status_code` was in `[200, 300)`.
    pub is_success: bool,
    /// When the attempt completed.
    pub created_at: DateTime<Utc>,
}

/// A new delivery attempt to be inserted.
#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = delivery_attempts)]
pub struct NewDeliveryAttempt {
    /// The subscription delivered to.
    pub subscription_id: i64,
    /// The webhook being delivered.
    pub webhook_id: i64,
    /// 1-based index within the webhook's retry chain.
    pub attempt_number: i32,
    /// HTTP status code, if a response was received.
    pub status_code: Option<i32>,
    /// Bounded prefix of the response body.
    pub response_body: Option<String>,
    /// Short error description.
    pub error_message: Option<String>,
    /// Success flag, computed from the status code.
    pub is_success: bool,
    /// When the attempt completed.
    pub created_at: DateTime<Utc>,
}

impl NewDeliveryAttempt {
    /// Creates a new attempt record, computing `is_success` from the status
    /// code and enforcing the success-row invariant (a successful attempt
    /// carries a status code and no error message).
    pub fn new(
        subscription_id: i64,
        webhook_id: i64,
        attempt_number: i32,
        status_code: Option<i32>,
        response_body: Option<String>,
        error_message: Option<String>,
    ) -> Result<Self, String> {
        if attempt_number < 1 {
            return Err("Attempt number must be at least 1".to_string());
        }

        let is_success = matches!(status_code, Some(code) if (200..300).contains(&code));
        if is_success && error_message.is_some() {
            return Err("A successful attempt cannot carry an error message".to_string());
        }

        Ok(Self {
            subscription_id,
            webhook_id,
            attempt_number,
            status_code,
            response_body,
            error_message,
            is_success,
            created_at: Utc::now(),
        })
    }
}
