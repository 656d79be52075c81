/*
 * Responsibility
 * - /users handlers (bearer route family)
 * - The acting user always comes from CurrentSession, never from the body
 */
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::users::{UpdateUserRequest, UserResponse},
        extractors::CurrentSession,
    },
    error::AppError,
    repos::user_repo::UserChanges,
    services::auth::password,
    state::AppState,
};

pub async fn get_me(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<UserResponse>, AppError> {
    let row = state
        .users
        .find_by_id(session.identity().user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let password_hash = match req.password {
        Some(pw) => Some(password::hash_password_blocking(pw).await?),
        None => None,
    };

    let changes = UserChanges {
        name: req.name.map(|n| n.trim().to_string()),
        password_hash,
    };

    let row = state
        .users
        .update(session.identity().user_id, changes)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    _session: CurrentSession,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let row = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}
