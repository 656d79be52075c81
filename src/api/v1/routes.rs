/*
 * Responsibility
 * - URL layout of v1
 * - Which routes are public and which route family guards the rest
 *   - bearer family: Authorization header in, header + JSON `token` field out on renewal
 *   - browser family: `token` cookie in, header + cookies out on renewal
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{login, logout, register},
    health::health,
    session::current_session,
    users::{get_me, get_user, update_me},
};
use crate::middleware::auth::{self, RouteFamily};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout));

    let bearer = auth::apply(
        Router::new()
            .route("/users/me", get(get_me).patch(update_me))
            .route("/users/{user_id}", get(get_user)),
        state,
        RouteFamily::bearer_api(),
    );

    let browser = auth::apply(
        Router::new().route("/session", get(current_session)),
        state,
        RouteFamily::browser(),
    );

    public.merge(bearer).merge(browser)
}
