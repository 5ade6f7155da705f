#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Once;
use tower::ServiceExt;
use uuid::Uuid;

use orgsuite_api::auth::issue_session_token;
use orgsuite_api::config::AppConfig;
use orgsuite_api::database::DatabaseManager;
use orgsuite_api::{app, AppState};

pub const ORG_ID: &str = "7f0c8a1e-3b7d-4a53-9f51-0a4c6a1d2b11";

pub fn config() -> AppConfig {
    AppConfig::development()
}

/// Router over a pool that never connects unless a handler reaches the database.
pub fn test_app() -> Router {
    let config = config();
    let pool = DatabaseManager::connect_lazy(&config.database).expect("lazy pool");
    app(AppState::new(pool, config))
}

pub fn token() -> String {
    token_for(Uuid::new_v4())
}

pub fn token_for(user_id: Uuid) -> String {
    issue_session_token(&config().security, user_id, Some("ada@example.com".to_string())).expect("sign token")
}

/// Export cap applied to database-backed tests.
pub const EXPORT_CAP: usize = 2;

static EXPORT_CAP_ENV: Once = Once::new();

/// Router over a migrated database, or `None` when `DATABASE_URL` is unset.
pub async fn db_app() -> Option<Router> {
    EXPORT_CAP_ENV.call_once(|| std::env::set_var("FILTER_MAX_EXPORT_ROWS", EXPORT_CAP.to_string()));

    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };
    let mut config = config();
    config.database.url = url;
    let pool = DatabaseManager::connect(&config.database).await.expect("connect");
    DatabaseManager::migrate(&pool).await.expect("migrate");
    Some(app(AppState::new(pool, config)))
}

/// Request builder for a specific user and organization.
pub fn as_user(method: &str, uri: &str, org: Uuid, user: Uuid, roles: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)))
        .header("x-org-id", org.to_string())
        .header("x-roles", roles)
}

/// Request builder carrying a valid session, the test org and `roles`.
pub fn authed(method: &str, uri: &str, roles: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .header("x-org-id", ORG_ID)
        .header("x-roles", roles)
}

pub fn json_body(builder: axum::http::request::Builder, body: &str) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty(builder: axum::http::request::Builder) -> Request<Body> {
    builder.body(Body::empty()).expect("request")
}

pub async fn send(request: Request<Body>) -> (StatusCode, Value) {
    send_to(&test_app(), request).await
}

pub async fn send_to(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, bytes.to_vec())
}
