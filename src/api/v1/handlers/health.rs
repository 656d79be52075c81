/*
 * Responsibility
 * - GET /health (liveness, outside every session pipeline)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "users": state.users.backend_name() })),
    )
}
