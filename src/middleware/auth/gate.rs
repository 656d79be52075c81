//! Authentication gate + renewal guard.
//!
//! - no credential            -> 401, handler is not reached
//! - credential fails verify  -> 403, handler is not reached
//! - verified                 -> `VerifiedSession` in request extensions,
//!   renewal evaluated, handler runs, `RenewalOutcome` staged on the response
//!
//! The outcome is only staged here; `propagate` attaches it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::error::AppError;
use crate::middleware::auth::credential::{self, RouteFamily};
use crate::services::auth::SessionService;

#[derive(Clone)]
pub struct GateState {
    pub sessions: Arc<SessionService>,
    pub family: RouteFamily,
}

pub async fn authenticate(
    State(gate): State<GateState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = credential::extract(req.headers(), gate.family.source) else {
        tracing::warn!(
            source = ?gate.family.source,
            path = %req.uri().path(),
            "no session credential presented"
        );
        return Err(AppError::Unauthorized);
    };

    // One clock reading drives both the expiry check and the renewal decision.
    let now = Utc::now();

    let session = match gate.sessions.verify_at(&token, now) {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %req.uri().path(),
                "session credential rejected"
            );
            return Err(AppError::Forbidden);
        }
    };

    let outcome = gate.sessions.renew_if_due(&session, now);

    // middleware -> extractor handoff
    req.extensions_mut().insert(session);

    let mut res = next.run(req).await;
    if outcome.is_renewed() {
        res.extensions_mut().insert(outcome);
    }
    Ok(res)
}
