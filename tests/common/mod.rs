//! Shared harness for the API integration tests.
//!
//! Tests run against the real router with an in-memory SQLite database.
//! The `more-di` provider constructs `DatabaseConnection` itself, so each
//! test parks its pool via `DatabaseConnection::set_test_pool()` and is
//! serialized with `serial_test`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use eventique_api::api;
use eventique_api::core::services::{
    DefaultAccountService, DefaultBookingService, DefaultCatalogService, DefaultMessagingService,
    DefaultReviewService,
};
use eventique_api::infrastructure::database::DatabaseConnection;
use eventique_api::infrastructure::repositories::{
    DbBookingRepository, DbCatalogRepository, DbMessageRepository, DbReviewRepository,
    DbUserRepository,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer, cookie::SameSite};

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Setup test database with migrations and returns pool.
/// Uses in-memory SQLite for test isolation.
pub async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    // File URI format with shared cache - each test gets a unique DB
    let db_url = format!("sqlite:file:testdb{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    DatabaseConnection::set_test_pool(pool.clone());

    pool
}

/// Clean up after test
pub fn cleanup_test_db() {
    DatabaseConnection::clear_test_pool();
}

/// Create test app - uses the global test pool set by setup_test_db().
/// Keep one instance per test; the session store lives in the layer.
pub fn create_test_app() -> Router {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::transient())
        .add(DbUserRepository::scoped())
        .add(DbCatalogRepository::scoped())
        .add(DbReviewRepository::scoped())
        .add(DbBookingRepository::scoped())
        .add(DbMessageRepository::scoped())
        .add(DefaultAccountService::scoped())
        .add(DefaultCatalogService::scoped())
        .add(DefaultReviewService::scoped())
        .add(DefaultBookingService::scoped())
        .add(DefaultMessagingService::scoped())
        .build_provider()
        .unwrap();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax);

    Router::new()
        .nest("/api", api::router())
        .layer(session_layer)
        .with_provider(provider)
}

/// Issue one request against the app, optionally with a session cookie and
/// JSON body, and return the status plus parsed response body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Register a user and return the response body plus the session cookie.
pub async fn register_user(app: &Router, username: &str, user_type: &str) -> (Value, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "password123",
                "firstName": "Test",
                "lastName": "User",
                "userType": user_type,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("register should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let user: Value = serde_json::from_slice(&bytes).unwrap();

    (user, cookie)
}

/// Create a service through the API as the given (business) session.
pub async fn create_service(app: &Router, cookie: &str, title: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/services",
        Some(cookie),
        Some(json!({
            "title": title,
            "description": "A test service",
            "price": "$$",
            "categoryId": uuid::Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

/// Book a service through the API as the given (customer) session.
pub async fn book_service(app: &Router, cookie: &str, service_id: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        &format!("/api/services/{service_id}/book"),
        Some(cookie),
        Some(json!({ "eventDate": "2026-09-12T18:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}
