/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use chrono::{Duration, Utc};
use hermod_models::models::delivery_attempts::NewDeliveryAttempt;
use serde_json::json;

#[test]
fn test_create_and_get_webhook() {
    let fixture = TestFixture::new();

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);
    let webhook = fixture.insert_test_webhook(subscription.id, "user.created");

    let retrieved = fixture
        .dal
        .webhooks()
        .get(webhook.id)
        .expect("Failed to get webhook")
        .expect("Webhook not found");

    assert_eq!(retrieved.subscription_id, subscription.id);
    assert_eq!(retrieved.event_type, "user.created");
    assert_eq!(retrieved.payload, json!({"x": 1}));
}

#[test]
fn test_deleting_subscription_cascades_to_webhooks() {
    let fixture = TestFixture::new();

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);
    let webhook = fixture.insert_test_webhook(subscription.id, "user.created");

    fixture
        .dal
        .subscriptions()
        .delete(subscription.id)
        .expect("Failed to delete subscription");

    let retrieved = fixture
        .dal
        .webhooks()
        .get(webhook.id)
        .expect("Query should succeed");
    assert!(retrieved.is_none());
}

#[test]
fn test_find_orphans_returns_attempt_less_webhooks() {
    let fixture = TestFixture::new();

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);
    let orphan = fixture.insert_test_webhook(subscription.id, "user.created");

    let delivered = fixture.insert_test_webhook(subscription.id, "user.created");
    let attempt = NewDeliveryAttempt::new(
        subscription.id,
        delivered.id,
        1,
        Some(200),
        None,
        None,
    )
    .unwrap();
    fixture
        .dal
        .delivery_attempts()
        .create(&attempt)
        .expect("Failed to record attempt");

    let cutoff = Utc::now() + Duration::seconds(1);
    let orphans = fixture
        .dal
        .webhooks()
        .find_orphans(cutoff)
        .expect("Failed to query orphans");

    assert!(orphans.iter().any(|w| w.id == orphan.id));
    assert!(!orphans.iter().any(|w| w.id == delivered.id));
}

#[test]
fn test_find_orphans_respects_cutoff() {
    let fixture = TestFixture::new();

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);
    let fresh = fixture.insert_test_webhook(subscription.id, "user.created");

    // A cutoff in the past excludes webhooks created just now.
    let cutoff = Utc::now() - Duration::minutes(60);
    let orphans = fixture
        .dal
        .webhooks()
        .find_orphans(cutoff)
        .expect("Failed to query orphans");

    assert!(!orphans.iter().any(|w| w.id == fresh.id));
}
