/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Background tasks for the Hermod server.
//!
//! Four loops run alongside the API:
//! - the delivery worker, consuming the deliver lane;
//! - the cleanup scheduler, the sole producer on the cleanup lane;
//! - the retention sweeper, consuming the cleanup lane;
//! - queue maintenance, releasing expired claims from crashed workers.

use crate::cache::SubscriptionCache;
use crate::dal::DAL;
use crate::delivery::{self, DeliveryConfig, TaskDisposition};
use crate::metrics;
use crate::queue::{Lane, TaskQueue};
use chrono::{Duration as ChronoDuration, Utc};
use hermod_utils::logging::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::interval;

/// Configuration for the delivery worker loop.
pub struct DeliveryWorkerConfig {
    /// How often to poll the deliver lane.
    pub poll_interval: Duration,
    /// Maximum tasks claimed per poll.
    pub batch_size: i64,
    /// Cap on concurrent in-flight deliveries.
    pub outbound_concurrency: usize,
    /// Delivery pipeline tunables.
    pub delivery: DeliveryConfig,
}

/// Starts the delivery worker loop.
///
/// Each poll claims a batch of deliver tasks and processes them
/// concurrently under the outbound concurrency cap. Tasks are acknowledged
/// only after their attempt row (and any follow-up enqueue) is persisted.
pub fn start_delivery_worker(
    dal: DAL,
    cache: SubscriptionCache,
    queue: TaskQueue,
    config: DeliveryWorkerConfig,
) {
    let DeliveryWorkerConfig {
        poll_interval,
        batch_size,
        outbound_concurrency,
        delivery: delivery_config,
    } = config;

    info!(
        "Starting delivery worker (poll: {:?}, batch: {}, concurrency: {})",
        poll_interval, batch_size, outbound_concurrency
    );

    let client = delivery::build_http_client(&delivery_config);
    let semaphore = Arc::new(Semaphore::new(outbound_concurrency));
    let delivery_config = Arc::new(delivery_config);

    tokio::spawn(async move {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;

            let tasks = match queue.consume(Lane::Deliver, batch_size) {
                Ok(tasks) => tasks,
                Err(e) => {
                    error!("Failed to claim deliver tasks: {:?}", e);
                    continue;
                }
            };

            for task in tasks {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                let dal = dal.clone();
                let cache = cache.clone();
                let queue = queue.clone();
                let client = client.clone();
                let delivery_config = delivery_config.clone();

                tokio::spawn(async move {
                    let disposition = delivery::process_deliver_task(
                        &dal,
                        &cache,
                        &queue,
                        &client,
                        &delivery_config,
                        &task,
                    )
                    .await;

                    let result = match disposition {
                        TaskDisposition::Ack => queue.ack(task.id),
                        TaskDisposition::Nack => queue.nack(task.id),
                    };
                    if let Err(e) = result {
                        // The claim expires and the task reappears on its own.
                        error!("Failed to settle queue task {}: {:?}", task.id, e);
                    }

                    drop(permit);
                });
            }
        }
    });
}

/// Configuration for the cleanup scheduler.
pub struct CleanupSchedulerConfig {
    /// How often a cleanup task is emitted.
    pub interval: Duration,
}

/// Starts the cleanup scheduler: one cleanup task per interval.
///
/// The sweep itself is idempotent, so duplicate emission across restarts or
/// multiple scheduler instances is harmless.
pub fn start_cleanup_scheduler(queue: TaskQueue, config: CleanupSchedulerConfig) {
    info!("Starting cleanup scheduler (interval: {:?})", config.interval);

    tokio::spawn(async move {
        let mut ticker = interval(config.interval);

        loop {
            ticker.tick().await;

            match queue.enqueue_cleanup() {
                Ok(task) => debug!("Emitted cleanup task {}", task.id),
                Err(e) => error!("Failed to emit cleanup task: {:?}", e),
            }
        }
    });
}

/// Configuration for the retention sweeper.
pub struct RetentionSweeperConfig {
    /// How often to poll the cleanup lane.
    pub poll_interval: Duration,
    /// Age after which delivery attempts are purged, in hours.
    pub retention_hours: i64,
    /// Rows deleted per statement.
    pub sweep_batch_size: i64,
}

/// Starts the retention sweeper, consuming the cleanup lane.
pub fn start_retention_sweeper(dal: DAL, queue: TaskQueue, config: RetentionSweeperConfig) {
    info!(
        "Starting retention sweeper (retention: {}h, batch: {})",
        config.retention_hours, config.sweep_batch_size
    );

    tokio::spawn(async move {
        let mut ticker = interval(config.poll_interval);

        loop {
            ticker.tick().await;

            let tasks = match queue.consume(Lane::Cleanup, 1) {
                Ok(tasks) => tasks,
                Err(e) => {
                    error!("Failed to claim cleanup tasks: {:?}", e);
                    continue;
                }
            };

            for task in tasks {
                match run_retention_sweep(&dal, config.retention_hours, config.sweep_batch_size) {
                    Ok(purged) => {
                        if purged > 0 {
                            info!("Retention sweep purged {} delivery attempts", purged);
                        }
                        if let Err(e) = queue.ack(task.id) {
                            error!("Failed to ack cleanup task {}: {:?}", task.id, e);
                        }
                    }
                    Err(e) => {
                        error!("Retention sweep failed: {:?}", e);
                        if let Err(e) = queue.nack(task.id) {
                            error!("Failed to nack cleanup task {}: {:?}", task.id, e);
                        }
                    }
                }
            }
        }
    });
}

/// Deletes all delivery attempts older than the retention horizon, in
/// bounded batches, until none remain. Returns the total rows purged.
pub fn run_retention_sweep(
    dal: &DAL,
    retention_hours: i64,
    sweep_batch_size: i64,
) -> Result<usize, diesel::result::Error> {
    let cutoff = Utc::now() - ChronoDuration::hours(retention_hours);
    let mut total = 0;

    loop {
        let deleted = dal
            .delivery_attempts()
            .delete_older_than(cutoff, sweep_batch_size)?;
        if deleted == 0 {
            break;
        }
        total += deleted;
        metrics::ATTEMPTS_PURGED_TOTAL.inc_by(deleted as u64);
    }

    Ok(total)
}

/// Starts the queue maintenance loop, releasing expired claims.
pub fn start_queue_maintenance(queue: TaskQueue, poll_interval: Duration) {
    info!("Starting queue maintenance (interval: {:?})", poll_interval);

    tokio::spawn(async move {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;

            match queue.release_expired() {
                Ok(released) => {
                    if released > 0 {
                        warn!("Released {} expired queue claims", released);
                    }
                }
                Err(e) => error!("Failed to release expired claims: {:?}", e),
            }
        }
    });
}
