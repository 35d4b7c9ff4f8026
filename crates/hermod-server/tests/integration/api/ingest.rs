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
use diesel::prelude::*;
use hermod_models::models::queue_tasks::QueueTask;
use hermod_models::models::subscriptions::UpdateSubscription;
use hermod_models::schema::{queue_tasks, webhooks};
use serde_json::json;
use tower::ServiceExt;

fn ingest_request(subscription_id: i64, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/ingest/{}", subscription_id))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn count_webhooks(fixture: &TestFixture, subscription_id: i64) -> i64 {
    let conn = &mut fixture.dal.pool.get().unwrap();
    webhooks::table
        .filter(webhooks::subscription_id.eq(subscription_id))
        .count()
        .get_result(conn)
        .unwrap()
}

fn deliver_task_exists(fixture: &TestFixture, webhook_id: i64) -> bool {
    let conn = &mut fixture.dal.pool.get().unwrap();
    let tasks: Vec<QueueTask> = queue_tasks::table
        .filter(queue_tasks::lane.eq("deliver"))
        .load(conn)
        .unwrap();
    tasks
        .iter()
        .any(|t| t.payload["webhook_id"] == json!(webhook_id))
}

#[tokio::test]
async fn test_ingest_happy_path() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    let response = app
        .oneshot(ingest_request(
            subscription.id,
            json!({"event_type": "user.created", "payload": {"x": 1}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let accepted: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(accepted["status"], "accepted");

    let webhook_id = accepted["webhook_id"].as_i64().unwrap();
    let webhook = fixture
        .dal
        .webhooks()
        .get(webhook_id)
        .unwrap()
        .expect("Webhook row should be committed");
    assert_eq!(webhook.event_type, "user.created");
    assert_eq!(webhook.payload, json!({"x": 1}));

    // The first attempt is enqueued on the deliver lane.
    assert!(deliver_task_exists(&fixture, webhook_id));
}

#[tokio::test]
async fn test_ingest_unknown_subscription() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let response = app
        .oneshot(ingest_request(
            0,
            json!({"event_type": "user.created", "payload": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ingest_inactive_subscription() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);
    let update = UpdateSubscription::new(None, None, None, Some(false)).unwrap();
    fixture
        .dal
        .subscriptions()
        .update(subscription.id, &update)
        .unwrap();

    let response = app
        .oneshot(ingest_request(
            subscription.id,
            json!({"event_type": "user.created", "payload": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(count_webhooks(&fixture, subscription.id), 0);
}

#[tokio::test]
async fn test_ingest_unsubscribed_event_type() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    let response = app
        .oneshot(ingest_request(
            subscription.id,
            json!({"event_type": "order.updated", "payload": {"x": 1}}),
        ))
        .await
        .unwrap();

    // 409, and no webhook row was written.
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(count_webhooks(&fixture, subscription.id), 0);
}

#[tokio::test]
async fn test_ingest_invalid_event_type() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    let response = app
        .oneshot(ingest_request(
            subscription.id,
            json!({"event_type": "bad event!", "payload": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_malformed_body() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router().with_state(fixture.app_state());

    let subscription = fixture.insert_test_subscription(vec!["user.created"]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/ingest/{}", subscription.id))
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
