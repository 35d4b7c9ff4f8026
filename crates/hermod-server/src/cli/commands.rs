/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Command implementations for the Hermod CLI.

use crate::api::{self, AppState};
use crate::cache::SubscriptionCache;
use crate::dal::DAL;
use crate::db::create_shared_connection_pool;
use crate::delivery::DeliveryConfig;
use crate::queue::TaskQueue;
use crate::utils;
use crate::utils::background_tasks::{
    self, CleanupSchedulerConfig, DeliveryWorkerConfig, RetentionSweeperConfig,
};
use chrono::{Duration as ChronoDuration, Utc};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use hermod_utils::config::Settings;
use hermod_utils::logging::prelude::*;
use std::time::Duration;
use tokio::signal;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../hermod-models/migrations");

/// How often expired queue claims are released and how often the cleanup
/// lane is polled. Both are slow-moving; a fixed cadence is enough.
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(30);

/// Starts the Hermod server: API, delivery workers, cleanup scheduler,
/// retention sweeper, and queue maintenance in one process.
pub async fn serve(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Hermod webhook delivery service");

    info!("Creating database connection pool");
    let pool = create_shared_connection_pool(&config.database.url, config.database.pool_size);

    info!("Running pending database migrations");
    let mut conn = pool.get().expect("Failed to get DB connection");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
    drop(conn);

    info!("Initializing Data Access Layer");
    let dal = DAL::new(pool);
    let cache = SubscriptionCache::new(config.cache.subscription_ttl_seconds);
    let queue = TaskQueue::new(dal.clone(), config.queue.visibility_timeout_seconds);

    info!("Starting background tasks");
    background_tasks::start_delivery_worker(
        dal.clone(),
        cache.clone(),
        queue.clone(),
        DeliveryWorkerConfig {
            poll_interval: Duration::from_millis(config.queue.poll_interval_ms),
            batch_size: config.delivery.batch_size,
            outbound_concurrency: config.delivery.outbound_concurrency,
            delivery: DeliveryConfig::from_settings(config),
        },
    );
    background_tasks::start_cleanup_scheduler(
        queue.clone(),
        CleanupSchedulerConfig {
            interval: Duration::from_secs(config.cleanup.interval_minutes * 60),
        },
    );
    background_tasks::start_retention_sweeper(
        dal.clone(),
        queue.clone(),
        RetentionSweeperConfig {
            poll_interval: MAINTENANCE_INTERVAL,
            retention_hours: config.cleanup.retention_hours,
            sweep_batch_size: config.cleanup.sweep_batch_size,
        },
    );
    background_tasks::start_queue_maintenance(queue.clone(), MAINTENANCE_INTERVAL);

    info!("Configuring API routes");
    let state = AppState { dal, cache, queue };
    let app = api::configure_api_routes().with_state(state);

    let addr = config.server.bind.clone();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
        shutdown_tx.send(()).ok();
    });

    info!("Hermod is now running");
    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown(shutdown_rx))
        .await?;

    Ok(())
}

/// Runs one retention sweep and exits.
pub fn cleanup(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let pool = create_shared_connection_pool(&config.database.url, 1);
    let dal = DAL::new(pool);

    let purged = background_tasks::run_retention_sweep(
        &dal,
        config.cleanup.retention_hours,
        config.cleanup.sweep_batch_size,
    )?;

    info!("Retention sweep purged {} delivery attempts", purged);
    println!("Purged {} delivery attempts", purged);
    Ok(())
}

/// Re-enqueues webhooks with no delivery attempts at all.
///
/// This is the manual reconciliation for the ingest-then-enqueue gap: a
/// webhook committed whose enqueue failed never gets an attempt. Duplicate
/// tasks are harmless; they terminate on the attempt-number constraint.
pub fn requeue_orphans(
    config: &Settings,
    older_than_minutes: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = create_shared_connection_pool(&config.database.url, 1);
    let dal = DAL::new(pool);
    let queue = TaskQueue::new(dal.clone(), config.queue.visibility_timeout_seconds);

    let cutoff = Utc::now() - ChronoDuration::minutes(older_than_minutes);
    let orphans = dal.webhooks().find_orphans(cutoff)?;

    let mut requeued = 0;
    for webhook in &orphans {
        match queue.enqueue_deliver(webhook.id, 1, ChronoDuration::zero()) {
            Ok(_) => requeued += 1,
            Err(e) => error!("Failed to re-enqueue webhook {}: {:?}", webhook.id, e),
        }
    }

    info!(
        "Re-enqueued {} of {} orphaned webhooks",
        requeued,
        orphans.len()
    );
    println!("Re-enqueued {} orphaned webhooks", requeued);
    Ok(())
}
