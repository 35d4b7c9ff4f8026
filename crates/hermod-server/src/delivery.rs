/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Webhook delivery execution.
//!
//! One deliver-lane task executes one attempt for a `(webhook_id,
//! attempt_number)` pair: load the webhook, resolve the subscription through
//! the cache, sign and POST the payload, record the outcome, and schedule
//! the next attempt or terminate the chain.
//!
//! Delivery errors are absorbed into recorded attempt rows; only
//! infrastructure failures (database, queue) push the task back for
//! queue-level redelivery.

use crate::cache::{SubscriptionCache, SubscriptionSnapshot};
use crate::dal::DAL;
use crate::metrics;
use crate::queue::TaskQueue;
use crate::utils::signing;
use chrono::Duration as ChronoDuration;
use hermod_models::models::delivery_attempts::NewDeliveryAttempt;
use hermod_models::models::queue_tasks::{DeliverTask, QueueTask};
use hermod_models::models::webhooks::Webhook;
use hermod_utils::config::Settings;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Delay applied when the backoff schedule is empty or exhausted.
const FALLBACK_BACKOFF_SECONDS: u64 = 60;

/// Tunables for the delivery pipeline.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Inclusive cap on attempts per webhook.
    pub max_attempts: i32,
    /// Delay after attempt N fails (1-indexed into this table).
    pub backoff_schedule_seconds: Vec<u64>,
    /// Hard timeout for each outbound POST.
    pub request_timeout: Duration,
    /// Maximum response body bytes captured per attempt.
    pub response_capture_bytes: usize,
}

impl DeliveryConfig {
    /// Extracts the delivery tunables from the application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.delivery.max_attempts,
            backoff_schedule_seconds: settings.delivery.backoff_schedule_seconds.clone(),
            request_timeout: Duration::from_secs(settings.delivery.request_timeout_seconds),
            response_capture_bytes: settings.delivery.response_capture_bytes,
        }
    }
}

/// Builds the shared outbound HTTP client: hard per-request timeout, no
/// redirect following (a redirect is the target declining this URL).
pub fn build_http_client(config: &DeliveryConfig) -> Client {
    Client::builder()
        .timeout(config.request_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build outbound HTTP client")
}

/// Classification of a delivery attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    /// 2xx response: the chain terminates successfully.
    Success,
    /// Transport error, timeout, 408, 429, or 5xx: eligible for retry.
    Retryable,
    /// Any other response: the target rejected the payload, no retry.
    Permanent,
}

impl OutcomeClass {
    /// Metric label for this outcome.
    pub fn as_label(&self) -> &'static str {
        match self {
            OutcomeClass::Success => "success",
            OutcomeClass::Retryable => "retryable",
            OutcomeClass::Permanent => "permanent",
        }
    }
}

/// Classifies an HTTP status code.
pub fn classify_status(status: u16) -> OutcomeClass {
    match status {
        200..=299 => OutcomeClass::Success,
        408 | 429 => OutcomeClass::Retryable,
        500..=599 => OutcomeClass::Retryable,
        _ => OutcomeClass::Permanent,
    }
}

/// Whether another attempt should be scheduled after `attempt_number`
/// finished with `class`.
pub fn should_retry(class: OutcomeClass, attempt_number: i32, max_attempts: i32) -> bool {
    class == OutcomeClass::Retryable && attempt_number < max_attempts
}

/// Delay before the attempt following failed attempt `attempt_number`.
pub fn backoff_delay(config: &DeliveryConfig, attempt_number: i32) -> ChronoDuration {
    let index = (attempt_number.max(1) as usize) - 1;
    let seconds = config
        .backoff_schedule_seconds
        .get(index)
        .or_else(|| config.backoff_schedule_seconds.last())
        .copied()
        .unwrap_or(FALLBACK_BACKOFF_SECONDS);
    ChronoDuration::seconds(seconds as i64)
}

/// The observable result of one outbound POST.
#[derive(Debug)]
pub struct AttemptResult {
    pub class: OutcomeClass,
    pub status_code: Option<i32>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
}

impl AttemptResult {
    /// Result for a POST that never produced a response. Always retryable.
    ///
    /// Timeouts and refused connections get stable messages so the attempt
    /// history groups cleanly per target; anything rarer keeps the client
    /// error's own description.
    fn transport_failure(config: &DeliveryConfig, error: &reqwest::Error) -> Self {
        let error_message = if error.is_timeout() {
            format!(
                "no response within {}s",
                config.request_timeout.as_secs()
            )
        } else if error.is_connect() {
            "target unreachable".to_string()
        } else {
            format!("delivery failed: {}", error)
        };

        Self {
            class: OutcomeClass::Retryable,
            status_code: None,
            response_body: None,
            error_message: Some(error_message),
        }
    }
}

/// Executes the outbound POST for one attempt.
///
/// The payload is serialized once and the same bytes are used for both the
/// signature and the request body.
pub async fn execute_attempt(
    client: &Client,
    config: &DeliveryConfig,
    subscription: &SubscriptionSnapshot,
    webhook: &Webhook,
    attempt_number: i32,
) -> AttemptResult {
    let body = match serde_json::to_vec(&webhook.payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            return AttemptResult {
                class: OutcomeClass::Permanent,
                status_code: None,
                response_body: None,
                error_message: Some(format!("payload serialization failed: {}", e)),
            };
        }
    };

    let signature = signing::sign(subscription.secret.as_bytes(), &body);

    let request = client
        .post(&subscription.target_url)
        .header("Content-Type", "application/json")
        .header("X-Webhook-Signature", signature)
        .header("X-Webhook-Event", &webhook.event_type)
        .header("X-Webhook-Id", webhook.id.to_string())
        .header("X-Webhook-Attempt", attempt_number.to_string())
        .body(body);

    match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let class = classify_status(status);
            let response_body = capture_body(response, config.response_capture_bytes).await;
            let error_message = match class {
                OutcomeClass::Success => None,
                _ => Some(format!("received status code {}", status)),
            };

            AttemptResult {
                class,
                status_code: Some(status as i32),
                response_body,
                error_message,
            }
        }
        Err(e) => AttemptResult::transport_failure(config, &e),
    }
}

/// Reads the response body, truncated to the capture limit.
async fn capture_body(response: reqwest::Response, capture_bytes: usize) -> Option<String> {
    match response.bytes().await {
        Ok(bytes) => {
            let truncated = &bytes[..bytes.len().min(capture_bytes)];
            Some(String::from_utf8_lossy(truncated).into_owned())
        }
        Err(_) => None,
    }
}

/// What the worker should do with the queue task after processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDisposition {
    /// Work is complete (or terminally unworkable); remove the task.
    Ack,
    /// Infrastructure failed mid-flight; return the task for redelivery.
    Nack,
}

/// Processes one deliver-lane task to completion.
pub async fn process_deliver_task(
    dal: &DAL,
    cache: &SubscriptionCache,
    queue: &TaskQueue,
    client: &Client,
    config: &DeliveryConfig,
    task: &QueueTask,
) -> TaskDisposition {
    let deliver: DeliverTask = match TaskQueue::parse_deliver(task) {
        Ok(deliver) => deliver,
        Err(e) => {
            error!(
                "Dropping malformed deliver task {}: {} (payload: {})",
                task.id, e, task.payload
            );
            return TaskDisposition::Ack;
        }
    };

    // 1. Load. A missing webhook was deleted mid-flight; drop silently.
    let webhook = match dal.webhooks().get(deliver.webhook_id) {
        Ok(Some(webhook)) => webhook,
        Ok(None) => {
            debug!(
                "Webhook {} gone before attempt {}, dropping task",
                deliver.webhook_id, deliver.attempt_number
            );
            return TaskDisposition::Ack;
        }
        Err(e) => {
            error!("Failed to load webhook {}: {:?}", deliver.webhook_id, e);
            return TaskDisposition::Nack;
        }
    };

    // 2. Resolve subscription through the cache.
    let snapshot = match cache.get(dal, webhook.subscription_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(
                "Failed to resolve subscription {}: {:?}",
                webhook.subscription_id, e
            );
            return TaskDisposition::Nack;
        }
    };

    let subscription = match snapshot {
        Some(snapshot) if snapshot.is_active => snapshot,
        _ => {
            // Terminal: record a single failed attempt, no retry.
            return record_terminal_failure(
                dal,
                &webhook,
                deliver.attempt_number,
                "subscription inactive or missing",
            );
        }
    };

    // 3-5. Build, execute, classify.
    let started = Instant::now();
    let result =
        execute_attempt(client, config, &subscription, &webhook, deliver.attempt_number).await;
    metrics::DELIVERY_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
    metrics::DELIVERY_ATTEMPTS_TOTAL
        .with_label_values(&[result.class.as_label()])
        .inc();

    // 6. Record.
    let new_attempt = match NewDeliveryAttempt::new(
        webhook.subscription_id,
        webhook.id,
        deliver.attempt_number,
        result.status_code,
        result.response_body,
        result.error_message,
    ) {
        Ok(attempt) => attempt,
        Err(e) => {
            error!(
                "Refusing to record invalid attempt for webhook {}: {}",
                webhook.id, e
            );
            return TaskDisposition::Ack;
        }
    };

    match record_attempt(dal, &new_attempt) {
        RecordOutcome::Inserted => {}
        RecordOutcome::Terminal => return TaskDisposition::Ack,
        RecordOutcome::Failed => return TaskDisposition::Nack,
    }

    // 7. Decide the next action.
    if should_retry(result.class, deliver.attempt_number, config.max_attempts) {
        let delay = backoff_delay(config, deliver.attempt_number);
        if let Err(e) =
            queue.enqueue_deliver(webhook.id, deliver.attempt_number + 1, delay)
        {
            // The attempt row is already persisted; redelivery of this task
            // will terminate as a duplicate, leaving the chain for operator
            // reconciliation (requeue-orphans covers attempt-less webhooks).
            error!(
                "Failed to schedule attempt {} for webhook {}: {:?}",
                deliver.attempt_number + 1,
                webhook.id,
                e
            );
            return TaskDisposition::Nack;
        }
        info!(
            "Webhook {} attempt {} failed ({}), retry in {}s",
            webhook.id,
            deliver.attempt_number,
            result.class.as_label(),
            delay.num_seconds()
        );
    } else {
        match result.class {
            OutcomeClass::Success => debug!(
                "Webhook {} delivered on attempt {}",
                webhook.id, deliver.attempt_number
            ),
            OutcomeClass::Permanent => info!(
                "Webhook {} rejected by target on attempt {}",
                webhook.id, deliver.attempt_number
            ),
            OutcomeClass::Retryable => warn!(
                "Webhook {} exhausted all {} attempts",
                webhook.id, config.max_attempts
            ),
        }
    }

    TaskDisposition::Ack
}

fn record_terminal_failure(
    dal: &DAL,
    webhook: &Webhook,
    attempt_number: i32,
    reason: &str,
) -> TaskDisposition {
    let new_attempt = match NewDeliveryAttempt::new(
        webhook.subscription_id,
        webhook.id,
        attempt_number,
        None,
        None,
        Some(reason.to_string()),
    ) {
        Ok(attempt) => attempt,
        Err(e) => {
            error!(
                "Refusing to record invalid attempt for webhook {}: {}",
                webhook.id, e
            );
            return TaskDisposition::Ack;
        }
    };

    match record_attempt(dal, &new_attempt) {
        RecordOutcome::Inserted | RecordOutcome::Terminal => TaskDisposition::Ack,
        RecordOutcome::Failed => TaskDisposition::Nack,
    }
}

enum RecordOutcome {
    /// The attempt row was inserted.
    Inserted,
    /// The chain already terminated elsewhere: duplicate redelivery of this
    /// attempt, or the webhook cascaded away mid-flight.
    Terminal,
    /// Database failure; the task should be redelivered.
    Failed,
}

fn record_attempt(dal: &DAL, new_attempt: &NewDeliveryAttempt) -> RecordOutcome {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match dal.delivery_attempts().create(new_attempt) {
        Ok(_) => RecordOutcome::Inserted,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            warn!(
                "Duplicate redelivery of webhook {} attempt {}, treating as terminal",
                new_attempt.webhook_id, new_attempt.attempt_number
            );
            RecordOutcome::Terminal
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            debug!(
                "Webhook {} deleted while recording attempt {}, dropping",
                new_attempt.webhook_id, new_attempt.attempt_number
            );
            RecordOutcome::Terminal
        }
        Err(e) => {
            error!(
                "Failed to record attempt {} for webhook {}: {:?}",
                new_attempt.attempt_number, new_attempt.webhook_id, e
            );
            RecordOutcome::Failed
        }
    }
}
