//! CORS for browser clients.
//!
//! Renewed credentials come back in the `Authorization` response header, so
//! it is listed in `Access-Control-Expose-Headers`; otherwise browsers hide it
//! from script.
//!
//! - Development: any origin, no credentials (cookies are same-site there).
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`, with
//!   credentials so the session cookies ride along. Empty allowlist = no CORS.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

pub fn apply(router: Router, config: &Config) -> Router {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::OPTIONS,
    ];
    let request_headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ];
    let exposed = [
        header::AUTHORIZATION,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ];

    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        // Credentials forbid wildcards, so everything is listed explicitly.
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_credentials(true)
            .allow_methods(methods)
            .allow_headers(request_headers)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(request_headers)
    }
    .expose_headers(exposed)
    .max_age(Duration::from_secs(60 * 10));

    router.layer(cors)
}
