#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use emerald_api::app::build_app;
use emerald_api::auth::jwt::JwtConfig;
use emerald_api::config::ServerConfig;
use emerald_api::state::AppState;
use emerald_core::reset_code::ResetCodeStore;
use emerald_mail::{EmailError, EmailMessage, Mailer};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        reset_code_ttl_mins: 15,
        reset_sweep_interval_secs: 60,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 24,
        },
    }
}

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, EmailMessage)>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<(String, EmailMessage)> {
        self.sent.lock().unwrap().clone()
    }

    /// The 6-digit code from the most recent reset email.
    pub fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let (_, message) = sent.last()?;
        message
            .body
            .split_whitespace()
            .find(|word| word.len() == 6 && word.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), message.clone()));
        Ok(())
    }
}

/// Handles a test needs beyond the router itself.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub reset_codes: Arc<ResetCodeStore>,
}

/// Build the full application with the production middleware stack and a
/// recording mailer.
pub fn spawn_app(pool: PgPool) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let reset_codes = Arc::new(ResetCodeStore::default());

    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        reset_codes: Arc::clone(&reset_codes),
        mailer: mailer.clone(),
    };

    TestApp {
        router: build_app(state),
        mailer,
        reset_codes,
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    spawn_app(pool).router
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A user registered through the API.
pub struct Registered {
    pub id: i64,
    pub token: String,
}

pub const TEST_PASSWORD: &str = "hunter2-but-longer";

/// Register `username` (email `<username>@example.com`) via the API.
pub async fn register(app: &Router, username: &str) -> Registered {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": TEST_PASSWORD,
    });
    let response = post_json(app.clone(), "/api/auth/register", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    Registered {
        id: json["id"].as_i64().unwrap(),
        token: json["token"].as_str().unwrap().to_string(),
    }
}
