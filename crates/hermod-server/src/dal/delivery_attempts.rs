/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for DeliveryAttempt operations.
//!
//! This module provides functionality to interact with the delivery_attempts
//! table: recording attempts, querying the attempt history, and the batched
//! retention delete used by the cleanup sweep.

use crate::dal::DAL;
use chrono::{DateTime, Utc};
use hermod_models::models::delivery_attempts::{DeliveryAttempt, NewDeliveryAttempt};
use hermod_models::schema::delivery_attempts;
use diesel::prelude::*;

/// Data Access Layer for DeliveryAttempt operations.
pub struct DeliveryAttemptsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl DeliveryAttemptsDAL<'_> {
    /// Records a delivery attempt.
    ///
    /// Duplicate `(webhook_id, attempt_number)` pairs violate the uniqueness
    /// constraint; callers treat that as a terminal duplicate redelivery.
    pub fn create(
        &self,
        new_attempt: &NewDeliveryAttempt,
    ) -> Result<DeliveryAttempt, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::insert_into(delivery_attempts::table)
            .values(new_attempt)
            .get_result(conn)
    }

    /// Gets a delivery attempt by ID.
    pub fn get(&self, id: i64) -> Result<Option<DeliveryAttempt>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        delivery_attempts::table
            .filter(delivery_attempts::id.eq(id))
            .first(conn)
            .optional()
    }

    /// Lists attempts for a subscription, newest first, with pagination.
    ///
    /// # Arguments
    ///
    /// * `subscription_id` - The subscription ID.
    /// * `limit` - Maximum number of attempts to return.
    /// * `offset` - Number of attempts to skip.
    pub fn list_for_subscription(
        &self,
        subscription_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DeliveryAttempt>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        delivery_attempts::table
            .filter(delivery_attempts::subscription_id.eq(subscription_id))
            .order(delivery_attempts::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load(conn)
    }

    /// Lists the full attempt chain for a webhook in attempt order.
    pub fn list_for_webhook(
        &self,
        webhook_id: i64,
    ) -> Result<Vec<DeliveryAttempt>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        delivery_attempts::table
            .filter(delivery_attempts::webhook_id.eq(webhook_id))
            .order(delivery_attempts::attempt_number.asc())
            .load(conn)
    }

    /// Deletes one batch of attempts older than `cutoff`.
    ///
    /// Deletes by ID so concurrent sweeps stay idempotent. Returns the number
    /// of rows removed; callers loop until this reaches zero.
    pub fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<usize, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        let batch_ids: Vec<i64> = delivery_attempts::table
            .filter(delivery_attempts::created_at.lt(cutoff))
            .order(delivery_attempts::created_at.asc())
            .limit(batch_size)
            .select(delivery_attempts::id)
            .load(conn)?;

        if batch_ids.is_empty() {
            return Ok(0);
        }

        diesel::delete(delivery_attempts::table.filter(delivery_attempts::id.eq_any(&batch_ids)))
            .execute(conn)
    }
}
