/*
 * Responsibility
 * - POST /auth/register, /auth/login, /auth/logout
 * - Issuance sets both session cookies and returns the credential in the body
 * - Logout only tells the client to drop the cookies; credentials stay valid until expiry
 */
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    api::v1::dto::auth::{
        AuthResponse, LoginRequest, LogoutResponse, RegisterRequest, normalize_email,
    },
    error::AppError,
    repos::user_repo::{NewUser, UserRow},
    services::auth::{password, token::SessionIdentity},
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    if !req.passwords_match() {
        return Err(AppError::Unauthorized);
    }

    let password_hash = password::hash_password_blocking(req.password).await?;
    let row = state
        .users
        .create(NewUser {
            email: normalize_email(&req.email),
            name: req.name.trim().to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %row.id, "user registered");

    let (jar, body) = start_session(&state, jar, row)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let row = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AppError::not_found("user"))?;

    let ok = password::verify_password_blocking(req.password, row.password_hash.clone()).await?;
    if !ok {
        tracing::warn!(user_id = %row.id, "login rejected: wrong password");
        return Err(AppError::Unauthorized);
    }

    let (jar, body) = start_session(&state, jar, row)?;
    Ok((jar, Json(body)))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let [token, user] = state.sessions.cookies().removal_cookies();
    (
        jar.add(token).add(user),
        Json(LogoutResponse {
            message: "logged out",
        }),
    )
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    row: UserRow,
) -> Result<(CookieJar, AuthResponse), AppError> {
    let identity = SessionIdentity::new(row.email.clone(), row.id);
    let credential = state.sessions.issue(&identity)?;

    let jar = state.sessions.cookies().issue(jar, &credential);
    let body = AuthResponse {
        token: credential.as_str().to_string(),
        expires_at: credential.expires_at(),
        user: row.into(),
    };
    Ok((jar, body))
}
