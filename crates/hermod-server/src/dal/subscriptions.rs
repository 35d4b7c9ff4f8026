/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for Subscription operations.
//!
//! This module provides functionality to interact with the subscriptions table.
//! It includes methods for creating, updating, deleting, and querying subscriptions.

use crate::dal::DAL;
use hermod_models::models::subscriptions::{NewSubscription, Subscription, UpdateSubscription};
use hermod_models::schema::subscriptions;
use diesel::prelude::*;

/// Data Access Layer for Subscription operations.
pub struct SubscriptionsDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl SubscriptionsDAL<'_> {
    /// Creates a new subscription.
    ///
    /// # Arguments
    ///
    /// * `new_subscription` - The subscription to create.
    ///
    /// # Returns
    ///
    /// Returns the created Subscription record.
    pub fn create(
        &self,
        new_subscription: &NewSubscription,
    ) -> Result<Subscription, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::insert_into(subscriptions::table)
            .values(new_subscription)
            .get_result(conn)
    }

    /// Gets a subscription by ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The subscription ID.
    ///
    /// # Returns
    ///
    /// Returns the subscription if found.
    pub fn get(&self, id: i64) -> Result<Option<Subscription>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        subscriptions::table
            .filter(subscriptions::id.eq(id))
            .first(conn)
            .optional()
    }

    /// Lists all subscriptions, newest first.
    ///
    /// # Arguments
    ///
    /// * `active_only` - If true, only return active subscriptions.
    pub fn list(&self, active_only: bool) -> Result<Vec<Subscription>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        let mut query = subscriptions::table.into_boxed();

        if active_only {
            query = query.filter(subscriptions::is_active.eq(true));
        }

        query.order(subscriptions::created_at.desc()).load(conn)
    }

    /// Updates a subscription.
    ///
    /// # Arguments
    ///
    /// * `id` - The subscription ID.
    /// * `update` - The fields to update.
    ///
    /// # Returns
    ///
    /// Returns the updated subscription.
    pub fn update(
        &self,
        id: i64,
        update: &UpdateSubscription,
    ) -> Result<Subscription, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::update(subscriptions::table.filter(subscriptions::id.eq(id)))
            .set(update)
            .get_result(conn)
    }

    /// Deletes a subscription. Webhooks and delivery attempts cascade.
    ///
    /// # Arguments
    ///
    /// * `id` - The subscription ID.
    ///
    /// # Returns
    ///
    /// Returns the number of deleted rows.
    pub fn delete(&self, id: i64) -> Result<usize, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::delete(subscriptions::table.filter(subscriptions::id.eq(id))).execute(conn)
    }
}
