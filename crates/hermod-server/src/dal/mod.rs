/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for the Hermod service.
//!
//! The [`DAL`] struct wraps the shared connection pool and hands out
//! per-entity accessors. Pool exhaustion is surfaced as a database error so
//! callers can answer with a transient-infrastructure response instead of
//! panicking on the hot path.

use crate::db::DbPool;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgConnection;

mod delivery_attempts;
mod queue_tasks;
mod subscriptions;
mod webhooks;

pub use delivery_attempts::DeliveryAttemptsDAL;
pub use queue_tasks::QueueTasksDAL;
pub use subscriptions::SubscriptionsDAL;
pub use webhooks::WebhooksDAL;

pub(crate) type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Data Access Layer holding the shared connection pool.
#[derive(Clone)]
pub struct DAL {
    /// The shared PostgreSQL connection pool.
    pub pool: DbPool,
}

impl DAL {
    /// Creates a new DAL instance over a connection pool.
    pub fn new(pool: DbPool) -> Self {
        DAL { pool }
    }

    /// Accessor for subscription operations.
    pub fn subscriptions(&self) -> SubscriptionsDAL {
        SubscriptionsDAL { dal: self }
    }

    /// Accessor for webhook operations.
    pub fn webhooks(&self) -> WebhooksDAL {
        WebhooksDAL { dal: self }
    }

    /// Accessor for delivery attempt operations.
    pub fn delivery_attempts(&self) -> DeliveryAttemptsDAL {
        DeliveryAttemptsDAL { dal: self }
    }

    /// Accessor for queue task operations.
    pub fn queue_tasks(&self) -> QueueTasksDAL {
        QueueTasksDAL { dal: self }
    }

    /// Checks out a pooled connection, mapping pool errors into diesel's
    /// error type so they propagate like any other database failure.
    pub(crate) fn conn(&self) -> Result<DbConnection, DieselError> {
        self.pool.get().map_err(|e| {
            DieselError::DatabaseError(
                DatabaseErrorKind::ClosedConnection,
                Box::new(e.to_string()),
            )
        })
    }
}
