//! Shared helpers for API integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use syncdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use syncdesk_api::auth::otp::OtpConfig;
use syncdesk_api::config::ServerConfig;
use syncdesk_api::notifications::StubNotificationSender;
use syncdesk_api::router::build_app_router;
use syncdesk_api::state::AppState;
use syncdesk_core::guardrails::GuardrailConfig;
use syncdesk_core::roles::Role;
use syncdesk_core::types::DbId;
use syncdesk_db::models::user::CreateUser;
use syncdesk_db::repositories::UserRepo;

/// Stub OTP codes wired into the test config.
pub const STUB_PARENT_CODE: &str = "000000";
pub const STUB_STAFF_CODE: &str = "424242";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        otp: OtpConfig {
            expiry_mins: 10,
            stub_parent_code: STUB_PARENT_CODE.to_string(),
            stub_staff_code: STUB_STAFF_CODE.to_string(),
        },
        default_school_id: 1,
        guardrails: GuardrailConfig::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier: Arc::new(StubNotificationSender),
    };
    build_app_router(state, &config)
}

/// Create a user row and mint a matching access token.
pub async fn seed_user(pool: &PgPool, phone: &str, role: Role, school_id: DbId) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            phone: phone.to_string(),
            role,
            school_id,
            name: None,
            email: None,
        },
    )
    .await
    .expect("seed user");

    let token = generate_access_token(user.id, role.as_str(), school_id, &test_config().jwt)
        .expect("seed token");
    (user.id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST with no body, for endpoints like `/satisfied` and `/read`.
pub async fn post_empty_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into a JSON value.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a response is an error with the given status whose message
/// contains `needle`.
pub async fn assert_error_contains(response: Response<Body>, status: StatusCode, needle: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    let message = json["error"].as_str().unwrap_or_default().to_string();
    assert!(
        message.contains(needle),
        "expected error containing {needle:?}, got {message:?}"
    );
}
