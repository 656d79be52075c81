//! Router-level tests: the real `Router` from `app::build_router`, an
//! in-memory user store, and requests driven through `tower::ServiceExt::oneshot`.

mod session_pipeline;

use std::sync::{Arc, OnceLock};

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    app::build_router,
    config::{AppEnv, Config},
    repos::user_repo::{MemoryUserRepo, NewUser, UserRow},
    services::auth::{
        build_session_service, password,
        token::{Credential, SessionIdentity},
    },
    state::AppState,
};

pub const PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        database_url: None,
        cors_allowed_origins: Vec::new(),
        request_timeout_seconds: 30,
        request_body_limit_bytes: 1024 * 1024,
        session_secret: "router-test-secret".to_string(),
        session_ttl: TimeDelta::seconds(3600),
        session_renewal_threshold: TimeDelta::seconds(600),
    }
}

/// Argon2 is slow in debug builds; hash the shared test password once.
fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| password::hash_password(PASSWORD).unwrap())
        .clone()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    pub fn bearer(&self) -> Option<String> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let state = AppState::new(
            build_session_service(&config),
            Arc::new(MemoryUserRepo::new()),
        );
        let router = build_router(state.clone(), &config);
        Self { router, state }
    }

    pub async fn seed_user(&self, email: &str) -> UserRow {
        self.state
            .users
            .create(NewUser {
                email: email.to_string(),
                name: "Seeded".to_string(),
                password_hash: password_hash(),
            })
            .await
            .unwrap()
    }

    pub fn credential_issued_at(&self, user: &UserRow, issued_at: DateTime<Utc>) -> Credential {
        self.state
            .sessions
            .issue_at(&SessionIdentity::new(user.email.clone(), user.id), issued_at)
            .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
