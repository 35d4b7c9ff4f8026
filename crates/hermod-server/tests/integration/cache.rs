/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use hermod_models::models::subscriptions::UpdateSubscription;

#[tokio::test]
async fn test_read_through_populates_cache() {
    let fixture = TestFixture::new();

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    assert!(fixture.cache.lookup(subscription.id).await.is_none());

    let snapshot = fixture
        .cache
        .get(&fixture.dal, subscription.id)
        .await
        .expect("Cache get failed")
        .expect("Subscription not found");
    assert_eq!(snapshot.target_url, "https://example.com/webhooks");
    assert!(snapshot.is_active);

    // The entry is now served from the cache.
    assert!(fixture.cache.lookup(subscription.id).await.is_some());
}

#[tokio::test]
async fn test_get_missing_subscription_is_not_cached() {
    let fixture = TestFixture::new();

    let result = fixture
        .cache
        .get(&fixture.dal, -1)
        .await
        .expect("Cache get failed");
    assert!(result.is_none());
    assert!(fixture.cache.lookup(-1).await.is_none());
}

#[tokio::test]
async fn test_stale_entry_served_until_invalidated() {
    let fixture = TestFixture::new();

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    // Warm the cache, then deactivate behind its back.
    fixture
        .cache
        .get(&fixture.dal, subscription.id)
        .await
        .unwrap();

    let update = UpdateSubscription::new(None, None, None, Some(false)).unwrap();
    fixture
        .dal
        .subscriptions()
        .update(subscription.id, &update)
        .expect("Failed to deactivate");

    // Within the TTL the stale snapshot is still served.
    let stale = fixture
        .cache
        .get(&fixture.dal, subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stale.is_active);

    // invalidate(id); get(id) returns the post-mutation state.
    fixture.cache.invalidate(subscription.id).await;
    let fresh = fixture
        .cache
        .get(&fixture.dal, subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!fresh.is_active);
}
