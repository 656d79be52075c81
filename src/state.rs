/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - sessions: issuance / verification / renewal / cookie policy
 *   - users: user persistence (Postgres or in-memory)
 * - Cheap to clone (Arc inside); read-only apart from the repo's own locking
 */
use std::sync::Arc;

use crate::repos::user_repo::UserRepo;
use crate::services::auth::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub users: Arc<dyn UserRepo>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionService>, users: Arc<dyn UserRepo>) -> Self {
        Self { sessions, users }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("users", &self.users.backend_name())
            .finish()
    }
}
