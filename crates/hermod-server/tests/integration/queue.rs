/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use chrono::Duration;
use hermod_server::queue::{Lane, TaskQueue};
use std::sync::Mutex;

// Queue tests claim from shared lanes; serialize them so one test's consume
// cannot hide another test's freshly enqueued task behind a claim.
static QUEUE_LOCK: Mutex<()> = Mutex::new(());

/// Consumes until the task with `task_id` is claimed, or the lane runs dry.
/// The lane is shared with other tests, so matching is by ID.
fn claim_task(queue: &TaskQueue, lane: Lane, task_id: i64) -> bool {
    loop {
        let claimed = queue.consume(lane, 100).expect("Failed to consume");
        if claimed.iter().any(|t| t.id == task_id) {
            return true;
        }
        if claimed.is_empty() {
            return false;
        }
    }
}

#[test]
fn test_enqueue_consume_ack_lifecycle() {
    let _guard = QUEUE_LOCK.lock().unwrap();
    let fixture = TestFixture::new();

    let task = fixture
        .queue
        .enqueue_deliver(990_001, 1, Duration::zero())
        .expect("Failed to enqueue");
    assert_eq!(task.lane, "deliver");
    assert_eq!(task.status, "pending");

    assert!(claim_task(&fixture.queue, Lane::Deliver, task.id));

    // A claimed task is invisible to further consumers.
    assert!(!claim_task(&fixture.queue, Lane::Deliver, task.id));

    fixture.queue.ack(task.id).expect("Failed to ack");
    assert!(!claim_task(&fixture.queue, Lane::Deliver, task.id));
}

#[test]
fn test_delayed_task_is_not_visible() {
    let _guard = QUEUE_LOCK.lock().unwrap();
    let fixture = TestFixture::new();

    let task = fixture
        .queue
        .enqueue_deliver(990_002, 2, Duration::seconds(300))
        .expect("Failed to enqueue");

    assert!(!claim_task(&fixture.queue, Lane::Deliver, task.id));

    fixture.queue.ack(task.id).expect("Failed to clean up");
}

#[test]
fn test_nack_makes_task_immediately_visible() {
    let _guard = QUEUE_LOCK.lock().unwrap();
    let fixture = TestFixture::new();

    let task = fixture
        .queue
        .enqueue_deliver(990_003, 1, Duration::zero())
        .expect("Failed to enqueue");

    assert!(claim_task(&fixture.queue, Lane::Deliver, task.id));
    fixture.queue.nack(task.id).expect("Failed to nack");
    assert!(claim_task(&fixture.queue, Lane::Deliver, task.id));

    fixture.queue.ack(task.id).expect("Failed to clean up");
}

#[test]
fn test_expired_claims_are_released() {
    let _guard = QUEUE_LOCK.lock().unwrap();
    let fixture = TestFixture::new();

    // A zero-second visibility timeout expires the claim immediately.
    let impatient = TaskQueue::new(fixture.dal.clone(), 0);

    let task = impatient
        .enqueue_deliver(990_004, 1, Duration::zero())
        .expect("Failed to enqueue");
    assert!(claim_task(&impatient, Lane::Deliver, task.id));

    std::thread::sleep(std::time::Duration::from_millis(50));

    let released = impatient.release_expired().expect("Failed to release");
    assert!(released >= 1);

    assert!(claim_task(&fixture.queue, Lane::Deliver, task.id));

    fixture.queue.ack(task.id).expect("Failed to clean up");
}

#[test]
fn test_cleanup_lane_is_separate() {
    let _guard = QUEUE_LOCK.lock().unwrap();
    let fixture = TestFixture::new();

    let cleanup_task = fixture
        .queue
        .enqueue_cleanup()
        .expect("Failed to enqueue cleanup");

    // Deliver consumers never see cleanup tasks.
    assert!(!claim_task(&fixture.queue, Lane::Deliver, cleanup_task.id));
    assert!(claim_task(&fixture.queue, Lane::Cleanup, cleanup_task.id));

    fixture.queue.ack(cleanup_task.id).expect("Failed to clean up");
}

#[test]
fn test_deliver_payload_round_trips() {
    let _guard = QUEUE_LOCK.lock().unwrap();
    let fixture = TestFixture::new();

    let task = fixture
        .queue
        .enqueue_deliver(990_005, 4, Duration::zero())
        .expect("Failed to enqueue");

    let parsed = TaskQueue::parse_deliver(&task).expect("Failed to parse payload");
    assert_eq!(parsed.webhook_id, 990_005);
    assert_eq!(parsed.attempt_number, 4);

    fixture.queue.ack(task.id).expect("Failed to clean up");
}
