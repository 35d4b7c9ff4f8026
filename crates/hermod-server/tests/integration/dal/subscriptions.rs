/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use hermod_models::models::subscriptions::UpdateSubscription;

#[test]
fn test_create_and_get_subscription() {
    let fixture = TestFixture::new();

    let created = fixture.insert_test_subscription(vec!["user.created", "order.updated"]);
    assert!(created.is_active);
    assert_eq!(created.secret, "secret-123");

    let retrieved = fixture
        .dal
        .subscriptions()
        .get(created.id)
        .expect("Failed to get subscription")
        .expect("Subscription not found");

    assert_eq!(retrieved.id, created.id);
    assert_eq!(retrieved.target_url, "https://example.com/webhooks");
    assert!(retrieved.subscribes_to("user.created"));
    assert!(retrieved.subscribes_to("order.updated"));
    assert!(!retrieved.subscribes_to("user.deleted"));
}

#[test]
fn test_get_missing_subscription() {
    let fixture = TestFixture::new();

    let result = fixture
        .dal
        .subscriptions()
        .get(-1)
        .expect("Query should succeed");
    assert!(result.is_none());
}

#[test]
fn test_list_contains_created_subscription() {
    let fixture = TestFixture::new();

    let created = fixture.insert_test_subscription(vec!["user.created"]);

    let all = fixture
        .dal
        .subscriptions()
        .list(false)
        .expect("Failed to list subscriptions");
    assert!(all.iter().any(|s| s.id == created.id));
}

#[test]
fn test_list_active_only_excludes_deactivated() {
    let fixture = TestFixture::new();

    let created = fixture.insert_test_subscription(vec!["user.created"]);
    let update = UpdateSubscription::new(None, None, None, Some(false)).unwrap();
    fixture
        .dal
        .subscriptions()
        .update(created.id, &update)
        .expect("Failed to deactivate");

    let active = fixture
        .dal
        .subscriptions()
        .list(true)
        .expect("Failed to list active subscriptions");
    assert!(!active.iter().any(|s| s.id == created.id));
}

#[test]
fn test_update_subscription_fields() {
    let fixture = TestFixture::new();

    let created = fixture.insert_test_subscription(vec!["user.created"]);
    let update = UpdateSubscription::new(
        Some("https://example.org/other".to_string()),
        None,
        Some(vec!["invoice.paid".to_string()]),
        None,
    )
    .unwrap();

    let updated = fixture
        .dal
        .subscriptions()
        .update(created.id, &update)
        .expect("Failed to update subscription");

    assert_eq!(updated.target_url, "https://example.org/other");
    assert!(updated.subscribes_to("invoice.paid"));
    assert!(!updated.subscribes_to("user.created"));
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn test_delete_subscription() {
    let fixture = TestFixture::new();

    let created = fixture.insert_test_subscription(vec!["user.created"]);

    let deleted = fixture
        .dal
        .subscriptions()
        .delete(created.id)
        .expect("Failed to delete subscription");
    assert_eq!(deleted, 1);

    let retrieved = fixture
        .dal
        .subscriptions()
        .get(created.id)
        .expect("Query should succeed");
    assert!(retrieved.is_none());
}
