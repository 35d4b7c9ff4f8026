/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer for queue task operations.
//!
//! Implements the claim-with-TTL state machine backing the task queue:
//!
//! - pending: visible once `available_at` has passed
//! - acquired: claimed by a worker, invisible until `acquired_until`
//!
//! Acknowledged tasks are deleted; expired claims are released back to
//! pending so crashed workers cannot strand work.

use crate::dal::DAL;
use chrono::{DateTime, Duration, Utc};
use hermod_models::models::queue_tasks::{
    NewQueueTask, QueueTask, TASK_STATUS_ACQUIRED, TASK_STATUS_PENDING,
};
use hermod_models::schema::queue_tasks;
use diesel::prelude::*;

/// Data Access Layer for queue task operations.
pub struct QueueTasksDAL<'a> {
    /// Reference to the main DAL instance.
    pub dal: &'a DAL,
}

impl QueueTasksDAL<'_> {
    /// Enqueues a new task.
    pub fn enqueue(&self, new_task: &NewQueueTask) -> Result<QueueTask, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::insert_into(queue_tasks::table)
            .values(new_task)
            .get_result(conn)
    }

    /// Claims up to `limit` visible pending tasks on `lane`.
    ///
    /// Candidates are selected first, then the update re-checks the pending
    /// status so racing consumers cannot claim the same task twice; only the
    /// rows actually transitioned are returned.
    pub fn claim(
        &self,
        lane: &str,
        limit: i64,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueTask>, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;
        let now = Utc::now();

        let candidate_ids: Vec<i64> = queue_tasks::table
            .filter(queue_tasks::lane.eq(lane))
            .filter(queue_tasks::status.eq(TASK_STATUS_PENDING))
            .filter(queue_tasks::available_at.le(now))
            .order(queue_tasks::available_at.asc())
            .limit(limit)
            .select(queue_tasks::id)
            .load(conn)?;

        if candidate_ids.is_empty() {
            return Ok(vec![]);
        }

        diesel::update(
            queue_tasks::table
                .filter(queue_tasks::id.eq_any(&candidate_ids))
                .filter(queue_tasks::status.eq(TASK_STATUS_PENDING)),
        )
        .set((
            queue_tasks::status.eq(TASK_STATUS_ACQUIRED),
            queue_tasks::acquired_until.eq(now + visibility_timeout),
        ))
        .get_results(conn)
    }

    /// Acknowledges a task, removing it from the queue.
    pub fn ack(&self, id: i64) -> Result<usize, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::delete(queue_tasks::table.filter(queue_tasks::id.eq(id))).execute(conn)
    }

    /// Negatively acknowledges a task, making it immediately visible again.
    pub fn nack(&self, id: i64) -> Result<usize, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;

        diesel::update(queue_tasks::table.filter(queue_tasks::id.eq(id)))
            .set((
                queue_tasks::status.eq(TASK_STATUS_PENDING),
                queue_tasks::acquired_until.eq(None::<DateTime<Utc>>),
                queue_tasks::available_at.eq(Utc::now()),
            ))
            .execute(conn)
    }

    /// Releases acquired tasks whose visibility deadline has passed.
    ///
    /// This should be called periodically to recover from crashed workers.
    ///
    /// # Returns
    ///
    /// Returns the number of released tasks.
    pub fn release_expired(&self) -> Result<usize, diesel::result::Error> {
        let conn = &mut self.dal.conn()?;
        let now = Utc::now();

        diesel::update(
            queue_tasks::table
                .filter(queue_tasks::status.eq(TASK_STATUS_ACQUIRED))
                .filter(queue_tasks::acquired_until.lt(now)),
        )
        .set((
            queue_tasks::status.eq(TASK_STATUS_PENDING),
            queue_tasks::acquired_until.eq(None::<DateTime<Utc>>),
        ))
        .execute(conn)
    }
}
