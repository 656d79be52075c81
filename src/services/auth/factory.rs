/// Factory: build `SessionService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    SessionService, cookies::CookiePolicy, renewal::RenewalGuard, token::TokenSigner,
};

pub fn build_session_service(config: &Config) -> Arc<SessionService> {
    let signer = TokenSigner::new(config.session_secret.as_bytes(), config.session_ttl);
    let renewal = RenewalGuard::new(config.session_renewal_threshold);
    let cookies = CookiePolicy::for_env(config.app_env);

    tracing::info!(
        ttl_seconds = signer.ttl().num_seconds(),
        renewal_threshold_seconds = renewal.threshold().num_seconds(),
        secure_cookies = cookies.secure(),
        "session service configured"
    );

    Arc::new(SessionService::new(signer, renewal, cookies))
}
