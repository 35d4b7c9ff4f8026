/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for Webhook operations.
//!
//! Webhooks are written once at ingest and read by the delivery worker;
//! the only other query finds orphans for operator reconciliation.

use crate::dal::DAL;
use chrono::{DateTime, Utc};
use hermod_models::models::webhooks::{NewWebhook, Webhook};
use hermod_models::schema::{delivery_attempts, webhooks};
use diesel::prelude::*;

/// Data Access Layer for Webhook operations.
pub struct WebhooksDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl WebhooksDAL<'_> {
    /// Creates a new webhook.
    pub fn create(&self, new_webhook: &NewWebhook) -> Result<Webhook, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::insert_into(webhooks::table)
            .values(new_webhook)
            .get_result(conn)
    }

    /// Gets a webhook by ID.
    pub fn get(&self, id: i64) -> Result<Option<Webhook>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        webhooks::table
            .filter(webhooks::id.eq(id))
            .first(conn)
            .optional()
    }

    /// Finds webhooks older than `cutoff` with no delivery attempts at all.
    ///
    /// These are the orphans left behind when an enqueue failed after the
    /// webhook row was committed; re-enqueueing them is safe because a
    /// surviving queued task would collide on the attempt-number constraint
    /// and terminate as a duplicate.
    pub fn find_orphans(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Webhook>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        webhooks::table
            .left_outer_join(
                delivery_attempts::table.on(delivery_attempts::webhook_id.eq(webhooks::id)),
            )
            .filter(delivery_attempts::id.is_null())
            .filter(webhooks::created_at.lt(cutoff))
            .select(Webhook::as_select())
            .order(webhooks::created_at.asc())
            .load(conn)
    }
}
