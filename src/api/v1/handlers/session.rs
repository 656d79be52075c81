/*
 * Responsibility
 * - GET /session (browser route family)
 * - Reports the credential that authorised this request, not a renewed one
 */
use axum::Json;

use crate::api::v1::{dto::auth::SessionResponse, extractors::CurrentSession};

pub async fn current_session(CurrentSession(session): CurrentSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        email: session.identity.email,
        user_id: session.identity.user_id,
        issued_at: session.issued_at,
        expires_at: session.expires_at,
    })
}
