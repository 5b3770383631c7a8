//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use time_bank::api::{self, AppState};
use time_bank::handlers::TransferPolicy;
use time_bank::store::MemoryStore;
use tower::util::ServiceExt;

/// Application over a fresh in-memory store. The store handle is returned
/// so tests can inject faults.
pub fn memory_app(policy: TransferPolicy) -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let app = api::build_app(AppState::new(Arc::new(store.clone()), policy));
    (app, store)
}

/// Send one request and decode the response body as JSON (plain text
/// bodies come back as a JSON string).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, json)
}

/// Connect to the test database, create the schema and empty all tables
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    time_bank::db::init_schema(&pool)
        .await
        .expect("Failed to create schema");

    sqlx::query("TRUNCATE TABLE transactions, services, users RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}
