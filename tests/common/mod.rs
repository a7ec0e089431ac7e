//! Shared helpers: in-memory and PostgreSQL-backed apps and a one-shot request driver.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use storefront_api::{ensure_database_exists, ensure_tables, router, AppState, MemoryStore, PgStore};
use tower::ServiceExt;

pub fn app() -> Router {
    router(AppState::new(MemoryStore::new()))
}

static DATABASE_SEQ: AtomicU64 = AtomicU64::new(0);

/// App backed by a fresh PostgreSQL database on the server named by `DATABASE_URL`.
/// Each call creates its own database so tests stay isolated. `None` when the variable
/// is unset; callers then skip.
pub async fn pg_app() -> Option<Router> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
        return None;
    };
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let name = format!(
        "storefront_test_{}_{}_{}",
        std::process::id(),
        nanos,
        DATABASE_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    let base = url.rfind('/').map(|i| &url[..=i]).expect("DATABASE_URL has a path");
    let test_url = format!("{}{}", base, name);

    ensure_database_exists(&test_url).await.expect("failed to create test database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&test_url)
        .await
        .expect("failed to connect to test database");
    ensure_tables(&pool).await.expect("failed to create tables");
    Some(router(AppState::new(PgStore::new(pool))))
}

/// Send one request and decode the body as JSON (`Value::String` for non-JSON bodies).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v).expect("serialize body"))
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("build request");
    let response = app.clone().oneshot(request).await.expect("failed to make request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

/// Create a customer and return its id.
pub async fn create_customer(app: &Router, name: &str, email: &str) -> i64 {
    let (status, _) = post(app, "/customers", serde_json::json!({"name": name, "email": email, "phone": "555-0100"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, found) = get(app, &format!("/customers/by-email?email={}", email)).await;
    found["id"].as_i64().expect("customer id")
}

/// Create a product and return its id.
pub async fn create_product(app: &Router, name: &str, price: f64) -> i64 {
    let (status, _) = post(app, "/products", serde_json::json!({"name": name, "price": price, "quantity": 10})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, found) = get(app, &format!("/products/by-name?name={}", name)).await;
    found["id"].as_i64().expect("product id")
}
