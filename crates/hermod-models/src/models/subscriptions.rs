/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Subscription models.
//!
//! A subscription registers a receiver: a target URL, a signing secret, and
//! the set of event types the receiver wants delivered. Inactive
//! subscriptions are skipped by both ingest validation and delivery.

use crate::schema::subscriptions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

/// Minimum length of a subscription signing secret.
pub const SECRET_MIN_LENGTH: usize = 8;
/// Maximum length of a subscription signing secret.
pub const SECRET_MAX_LENGTH: usize = 64;
/// Maximum number of event types a single subscription may carry.
pub const MAX_EVENT_TYPES: usize = 10;
/// Maximum length of a single event type identifier.
pub const EVENT_TYPE_MAX_LENGTH: usize = 64;

/// A subscription record from the database.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscription {
    /// Unique identifier for the subscription.
    pub id: i64,
    /// Absolute HTTP(S) URL webhooks are POSTed to.
    pub target_url: String,
    /// HMAC-SHA256 signing key. Never serialized in API responses.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Event types this subscription receives (exact membership).
    pub event_types: Vec<Option<String>>,
    /// Whether the subscription currently receives deliveries.
    pub is_active: bool,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// When the subscription was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Tests whether `event_type` is a member of this subscription's set.
    pub fn subscribes_to(&self, event_type: &str) -> bool {
        self.event_types
            .iter()
            .any(|t| t.as_deref() == Some(event_type))
    }
}

/// A new subscription to be inserted.
#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscription {
    /// Absolute HTTP(S) URL webhooks are POSTed to.
    pub target_url: String,
    /// HMAC-SHA256 signing key.
    pub secret: String,
    /// Event types this subscription receives.
    pub event_types: Vec<Option<String>>,
    /// Whether the subscription starts active (defaults to true).
    pub is_active: bool,
}

impl NewSubscription {
    /// Creates a new subscription after validating its fields.
    ///
    /// # Arguments
    /// * `target_url` - Absolute http(s) URL.
    /// * `secret` - Signing secret, 8..=64 chars of `[A-Za-z0-9_-]`.
    /// * `event_types` - Non-empty set of event type identifiers.
    ///
    /// # Returns
    /// A Result containing the new subscription or a validation error.
    pub fn new(
        target_url: String,
        secret: String,
        event_types: Vec<String>,
    ) -> Result<Self, String> {
        validate_target_url(&target_url)?;
        validate_secret(&secret)?;
        validate_event_types(&event_types)?;

        Ok(Self {
            target_url,
            secret,
            event_types: event_types.into_iter().map(Some).collect(),
            is_active: true,
        })
    }
}

/// Changeset for updating a subscription.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub struct UpdateSubscription {
    /// New target URL.
    pub target_url: Option<String>,
    /// New signing secret.
    pub secret: Option<String>,
    /// New event type set.
    pub event_types: Option<Vec<Option<String>>>,
    /// Activate or deactivate the subscription.
    pub is_active: Option<bool>,
    /// Bumped on every update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UpdateSubscription {
    /// Builds a changeset after validating the provided fields.
    pub fn new(
        target_url: Option<String>,
        secret: Option<String>,
        event_types: Option<Vec<String>>,
        is_active: Option<bool>,
    ) -> Result<Self, String> {
        if let Some(ref url) = target_url {
            validate_target_url(url)?;
        }
        if let Some(ref secret) = secret {
            validate_secret(secret)?;
        }
        if let Some(ref types) = event_types {
            validate_event_types(types)?;
        }

        Ok(Self {
            target_url,
            secret,
            event_types: event_types.map(|types| types.into_iter().map(Some).collect()),
            is_active,
            updated_at: Some(Utc::now()),
        })
    }
}

fn validate_target_url(target_url: &str) -> Result<(), String> {
    let parsed = Url::parse(target_url).map_err(|_| "Target URL is not a valid absolute URL")?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err("Target URL must use the http or https scheme".to_string()),
    }
}

fn validate_secret(secret: &str) -> Result<(), String> {
    if secret.len() < SECRET_MIN_LENGTH {
        return Err(format!(
            "Secret must be at least {} characters",
            SECRET_MIN_LENGTH
        ));
    }
    if secret.len() > SECRET_MAX_LENGTH {
        return Err(format!(
            "Secret cannot exceed {} characters",
            SECRET_MAX_LENGTH
        ));
    }
    if !secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "Secret must contain only alphanumeric characters, underscores, and hyphens"
                .to_string(),
        );
    }
    Ok(())
}

fn validate_event_types(event_types: &[String]) -> Result<(), String> {
    if event_types.is_empty() {
        return Err("At least one event type is required".to_string());
    }
    if event_types.len() > MAX_EVENT_TYPES {
        return Err(format!(
            "At most {} event types are allowed",
            MAX_EVENT_TYPES
        ));
    }
    for event_type in event_types {
        validate_event_type(event_type)?;
    }
    Ok(())
}

/// Validates a single event type identifier.
pub fn validate_event_type(event_type: &str) -> Result<(), String> {
    if event_type.is_empty() || event_type.len() > EVENT_TYPE_MAX_LENGTH {
        return Err(format!(
            "Event type must be between 1 and {} characters",
            EVENT_TYPE_MAX_LENGTH
        ));
    }
    if !event_type
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(
            "Event types must contain only alphanumeric characters, underscores, hyphens, and dots"
                .to_string(),
        );
    }
    Ok(())
}
