use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::token::{SessionIdentity, VerifiedSession};
use crate::state::AppState;

/// The session that authorised this request.
///
/// Inserted into request extensions by the gate middleware. If it is missing
/// the route was mounted without the gate, and the request is rejected with
/// 401 instead of running unauthenticated.
///
/// A credential renewed during this request does not replace this value.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub VerifiedSession);

impl CurrentSession {
    pub fn identity(&self) -> &SessionIdentity {
        &self.0.identity
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedSession>()
            .cloned()
            .map(CurrentSession)
            .ok_or(AppError::Unauthorized)
    }
}
