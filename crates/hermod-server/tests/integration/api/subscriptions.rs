/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_subscription_success() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/subscriptions",
            json!({
                "target_url": "https://example.com/webhooks",
                "secret": "my_secure_secret_123",
                "event_types": ["user.created", "order.updated"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let subscription: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(subscription["id"].as_i64().unwrap() > 0);
    assert_eq!(subscription["target_url"], "https://example.com/webhooks");
    assert_eq!(subscription["is_active"], true);
    // The signing secret never appears in API responses.
    assert!(subscription.get("secret").is_none());
}

#[tokio::test]
async fn test_create_subscription_short_secret_rejected() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/subscriptions",
            json!({
                "target_url": "https://example.com/webhooks",
                "secret": "short",
                "event_types": ["user.created"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_subscription_empty_event_types_rejected() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/subscriptions",
            json!({
                "target_url": "https://example.com/webhooks",
                "secret": "secret-123",
                "event_types": []
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_subscription_invalid_url_rejected() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/subscriptions",
            json!({
                "target_url": "not-a-url",
                "secret": "secret-123",
                "event_types": ["user.created"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_subscription_not_found() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/subscriptions/0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_subscription_invalidates_cache() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    // Warm the cache so the update has something to invalidate.
    fixture
        .cache
        .get(&fixture.dal, subscription.id)
        .await
        .unwrap();
    assert!(fixture.cache.lookup(subscription.id).await.is_some());

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/subscriptions/{}", subscription.id),
            json!({"is_active": false}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let updated: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated["is_active"], false);

    assert!(fixture.cache.lookup(subscription.id).await.is_none());
}

#[tokio::test]
async fn test_update_subscription_rejects_bad_secret() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/subscriptions/{}", subscription.id),
            json!({"secret": "short"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_subscription_cascades() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);
    let webhook = fixture.insert_test_webhook(subscription.id, "user.created");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/subscriptions/{}", subscription.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(fixture
        .dal
        .subscriptions()
        .get(subscription.id)
        .unwrap()
        .is_none());
    assert!(fixture.dal.webhooks().get(webhook.id).unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_subscription() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/subscriptions/0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
