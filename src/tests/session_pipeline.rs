//! Gate, renewal and propagation as seen from outside the router.

use axum::http::{StatusCode, header};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;
use uuid::Uuid;

use super::{TestApp, get, get_with, json_request};
use crate::services::auth::token::{SessionIdentity, TokenSigner};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn missing_credential_is_401_and_handler_is_not_reached() {
    let app = TestApp::new();

    let res = app.send(get("/api/v1/users/me")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"]["code"], "UNAUTHORIZED");
    assert!(res.bearer().is_none());

    let res = app.send(get("/api/v1/session")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_credential_is_403() {
    let app = TestApp::new();

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            "Bearer malformed.token",
        ))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn non_bearer_scheme_counts_as_missing() {
    let app = TestApp::new();
    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            "Basic dXNlcjpwdw==",
        ))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_credential_is_403() {
    let app = TestApp::new();
    let user = app.seed_user("expired@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now() - TimeDelta::seconds(3601));

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &bearer(credential.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.bearer().is_none());
}

#[tokio::test]
async fn foreign_secret_is_403() {
    let app = TestApp::new();
    let user = app.seed_user("foreign@example.com").await;
    let foreign = TokenSigner::new(b"some-other-secret", TimeDelta::seconds(3600))
        .issue(&SessionIdentity::new(user.email.clone(), user.id))
        .unwrap();

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &bearer(foreign.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn fresh_credential_passes_without_renewal() {
    let app = TestApp::new();
    let user = app.seed_user("fresh@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now());

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &bearer(credential.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.bearer().is_none());
    assert!(res.set_cookies().is_empty());

    let body = res.json();
    assert_eq!(body["email"], "fresh@example.com");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn near_expiry_bearer_request_gets_header_and_body_token() {
    let app = TestApp::new();
    let user = app.seed_user("sliding@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now() - TimeDelta::seconds(3100));

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &bearer(credential.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let renewed = res.bearer().expect("renewed credential in Authorization header");
    assert_ne!(renewed, credential.as_str());

    let body = res.json();
    assert_eq!(body["token"], renewed.as_str());
    assert_eq!(body["id"], user.id.to_string());
    assert!(res.set_cookies().is_empty());

    let session = app.state.sessions.verify_at(&renewed, Utc::now()).unwrap();
    assert_eq!(session.identity.user_id, user.id);
    assert_eq!(session.identity.email, user.email);
    assert!(session.expires_at > credential.expires_at());
}

#[tokio::test]
async fn renewal_reaches_error_responses_too() {
    let app = TestApp::new();
    let user = app.seed_user("lookup@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now() - TimeDelta::seconds(3300));

    let res = app
        .send(get_with(
            &format!("/api/v1/users/{}", Uuid::new_v4()),
            header::AUTHORIZATION,
            &bearer(credential.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let renewed = res.bearer().expect("renewal is not tied to handler success");
    let body = res.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["token"], renewed.as_str());
}

#[tokio::test]
async fn renewed_credential_is_accepted_on_the_next_request() {
    let app = TestApp::new();
    let user = app.seed_user("chain@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now() - TimeDelta::seconds(3500));

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &bearer(credential.as_str()),
        ))
        .await;
    let renewed = res.bearer().unwrap();

    let res = app
        .send(get_with(
            "/api/v1/users/me",
            header::AUTHORIZATION,
            &bearer(&renewed),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.bearer().is_none());
}

#[tokio::test]
async fn patch_me_under_renewal_returns_updated_user_and_token() {
    let app = TestApp::new();
    let user = app.seed_user("rename@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now() - TimeDelta::seconds(3200));

    let mut req = json_request("PATCH", "/api/v1/users/me", json!({ "name": "Renamed" }));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        bearer(credential.as_str()).parse().unwrap(),
    );

    let res = app.send(req).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["token"], res.bearer().unwrap().as_str());
}

#[tokio::test]
async fn browser_family_reads_the_cookie_only() {
    let app = TestApp::new();
    let user = app.seed_user("cookie@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now());

    let res = app
        .send(get_with(
            "/api/v1/session",
            header::AUTHORIZATION,
            &bearer(credential.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .send(get_with(
            "/api/v1/session",
            header::COOKIE,
            &format!("token={}; user_id={}", credential.as_str(), user.id),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.bearer().is_none());
    assert!(res.set_cookies().is_empty());
    assert_eq!(res.json()["user_id"], user.id.to_string());
}

#[tokio::test]
async fn browser_family_renewal_refreshes_cookies_and_keeps_current_identity() {
    let app = TestApp::new();
    let user = app.seed_user("browser@example.com").await;
    let credential = app.credential_issued_at(&user, Utc::now() - TimeDelta::seconds(3400));

    let res = app
        .send(get_with(
            "/api/v1/session",
            header::COOKIE,
            &format!("token={}", credential.as_str()),
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let renewed = res.bearer().expect("renewed credential in Authorization header");
    let cookies = res.set_cookies();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with(&format!("token={renewed};"))));
    assert!(cookies.iter().any(|c| c.starts_with(&format!("user_id={};", user.id))));

    // The handler reports the credential that authorised the request.
    let body = res.json();
    assert!(body.get("token").is_none());
    let reported: DateTime<Utc> = serde_json::from_value(body["expires_at"].clone()).unwrap();
    assert_eq!(reported, credential.expires_at());
}

#[tokio::test]
async fn public_routes_skip_the_gate() {
    let app = TestApp::new();

    let res = app.send(get("/api/v1/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
    assert!(res.headers.contains_key("x-request-id"));

    let res = app.send(get("/api/v1/nope")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
