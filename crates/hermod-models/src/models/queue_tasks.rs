/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Task queue models.
//!
//! Rows back the durable two-lane work queue. A task is `pending` until a
//! worker claims it (`acquired`, with a visibility deadline); acknowledged
//! tasks are deleted, expired claims are released back to pending.

use crate::schema::queue_tasks;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Lane carrying webhook delivery tasks.
pub const LANE_DELIVER: &str = "deliver";
/// Lane carrying retention cleanup tasks.
pub const LANE_CLEANUP: &str = "cleanup";

pub const TASK_STATUS_PENDING: &str = "pending";
pub const TASK_STATUS_ACQUIRED: &str = "acquired";

/// A queued task record from the database.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = queue_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QueueTask {
    /// Unique identifier for the task.
    pub id: i64,
    /// Which lane the task belongs to.
    pub lane: String,
    /// Task payload; for the deliver lane, a serialized [`DeliverTask`].
    pub payload: serde_json::Value,
    /// Task status: pending or acquired.
    pub status: String,
    /// Earliest time the task becomes visible to consumers.
    pub available_at: DateTime<Utc>,
    /// Visibility deadline while claimed; null when pending.
    pub acquired_until: Option<DateTime<Utc>>,
    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,
}

/// A new task to be enqueued.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = queue_tasks)]
pub struct NewQueueTask {
    pub lane: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub available_at: DateTime<Utc>,
}

impl NewQueueTask {
    /// Creates a pending task on `lane`, visible after `delay`.
    pub fn new(lane: &str, payload: serde_json::Value, delay: Duration) -> Result<Self, String> {
        if lane != LANE_DELIVER && lane != LANE_CLEANUP {
            return Err(format!("Unknown queue lane: {}", lane));
        }

        Ok(Self {
            lane: lane.to_string(),
            payload,
            status: TASK_STATUS_PENDING.to_string(),
            available_at: Utc::now() + delay,
        })
    }
}

/// Payload of a deliver-lane task: one attempt of one webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverTask {
    /// The webhook to deliver.
    pub webhook_id: i64,
    /// 1-based attempt number this task executes.
    pub attempt_number: i32,
}
