//! Session pipeline for protected routes:
//! credential -> gate (verify + renewal) -> handler -> propagate.

pub mod credential;
pub mod gate;
pub mod propagate;

use axum::{Router, middleware};

pub use credential::RouteFamily;

use crate::state::AppState;

/// Protect every route in `router` with the session pipeline of `family`.
///
/// `route_layer` keeps unmatched paths answering 404 rather than 401.
/// The propagator is layered last so it wraps the gate and sees its outcome.
pub fn apply(router: Router<AppState>, state: &AppState, family: RouteFamily) -> Router<AppState> {
    let gate = gate::GateState {
        sessions: state.sessions.clone(),
        family,
    };
    let propagate = propagate::PropagateState {
        delivery: family.delivery,
        cookies: *state.sessions.cookies(),
    };

    router
        .route_layer(middleware::from_fn_with_state(gate, gate::authenticate))
        .route_layer(middleware::from_fn_with_state(
            propagate,
            propagate::propagate_renewal,
        ))
}
