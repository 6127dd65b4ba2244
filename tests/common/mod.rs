// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tripshare::config::Config;
use tripshare::db::{Database, FirestoreDb, MemoryDb};
use tripshare::routes::create_router;
use tripshare::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Database::Memory(MemoryDb::new()))
}

/// Create a test app whose store is disconnected (every call fails).
#[allow(dead_code)]
pub fn create_offline_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Database::Firestore(FirestoreDb::new_offline()))
}

fn create_test_app_with(db: Database) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), db));
    (create_router(state.clone()), state)
}

/// Send a request with an optional JSON body; returns status and parsed body.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

/// Send a request with a bearer token.
#[allow(dead_code)]
pub async fn send_authed(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// A valid trip payload.
#[allow(dead_code)]
pub fn sample_trip(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": "Coastal ride",
        "creatorId": "64b0c0ffee64b0c0ffee64b0",
        "startLocation": "Santa Cruz",
        "endLocation": "Monterey",
        "waypoints": [
            {"name": "Lunch", "location": "Moss Landing", "description": "Chowder"},
            {"name": "Viewpoint", "location": "Marina", "description": ""}
        ]
    })
}

/// Register a user, asserting success.
#[allow(dead_code)]
pub async fn register(app: &Router, username: &str, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/users/register",
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

/// Log in, returning status and body.
#[allow(dead_code)]
pub async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/users/login",
        Some(serde_json::json!({
            "username": username,
            "password": password,
        })),
    )
    .await
}
