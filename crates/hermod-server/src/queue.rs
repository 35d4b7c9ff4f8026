/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Durable task queue over the `queue_tasks` table.
//!
//! Two logical lanes: `deliver` carries webhook delivery tasks (with delayed
//! visibility for retry backoff), `cleanup` carries scheduled retention
//! sweeps. Delivery is at-least-once: a task stays invisible for the
//! visibility timeout after being claimed and reappears if the worker never
//! acknowledges it.

use crate::dal::DAL;
use chrono::Duration;
use hermod_models::models::queue_tasks::{
    DeliverTask, NewQueueTask, QueueTask, LANE_CLEANUP, LANE_DELIVER,
};
use serde_json::json;

/// The two logical lanes of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Webhook delivery tasks.
    Deliver,
    /// Retention sweep tasks.
    Cleanup,
}

impl Lane {
    /// The lane's column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Deliver => LANE_DELIVER,
            Lane::Cleanup => LANE_CLEANUP,
        }
    }
}

/// Handle on the durable task queue.
#[derive(Clone)]
pub struct TaskQueue {
    dal: DAL,
    visibility_timeout: Duration,
}

impl TaskQueue {
    /// Creates a queue handle with the given claim visibility timeout.
    pub fn new(dal: DAL, visibility_timeout_seconds: i64) -> Self {
        Self {
            dal,
            visibility_timeout: Duration::seconds(visibility_timeout_seconds),
        }
    }

    /// Enqueues a delivery task for `(webhook_id, attempt_number)`, visible
    /// after `delay`.
    pub fn enqueue_deliver(
        &self,
        webhook_id: i64,
        attempt_number: i32,
        delay: Duration,
    ) -> Result<QueueTask, diesel::result::Error> {
        let payload = json!(DeliverTask {
            webhook_id,
            attempt_number,
        });
        self.enqueue(Lane::Deliver, payload, delay)
    }

    /// Enqueues an immediately-visible cleanup task.
    pub fn enqueue_cleanup(&self) -> Result<QueueTask, diesel::result::Error> {
        self.enqueue(Lane::Cleanup, json!({}), Duration::zero())
    }

    fn enqueue(
        &self,
        lane: Lane,
        payload: serde_json::Value,
        delay: Duration,
    ) -> Result<QueueTask, diesel::result::Error> {
        let new_task = NewQueueTask::new(lane.as_str(), payload, delay)
            .map_err(|e| diesel::result::Error::QueryBuilderError(e.into()))?;
        self.dal.queue_tasks().enqueue(&new_task)
    }

    /// Claims up to `max` visible tasks on `lane`.
    pub fn consume(&self, lane: Lane, max: i64) -> Result<Vec<QueueTask>, diesel::result::Error> {
        self.dal
            .queue_tasks()
            .claim(lane.as_str(), max, self.visibility_timeout)
    }

    /// Acknowledges a task, removing it permanently.
    pub fn ack(&self, task_id: i64) -> Result<(), diesel::result::Error> {
        self.dal.queue_tasks().ack(task_id)?;
        Ok(())
    }

    /// Returns a task to the queue for immediate redelivery.
    pub fn nack(&self, task_id: i64) -> Result<(), diesel::result::Error> {
        self.dal.queue_tasks().nack(task_id)?;
        Ok(())
    }

    /// Releases claims whose visibility deadline has passed.
    pub fn release_expired(&self) -> Result<usize, diesel::result::Error> {
        self.dal.queue_tasks().release_expired()
    }

    /// Parses a deliver-lane task payload.
    pub fn parse_deliver(task: &QueueTask) -> Result<DeliverTask, serde_json::Error> {
        serde_json::from_value(task.payload.clone())
    }
}
