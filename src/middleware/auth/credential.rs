//! Credential extraction and per-route-family configuration.
//!
//! A route family commits to exactly one place it reads credentials from and
//! to a fixed set of channels a renewed credential is delivered through.
//! Missing credentials are reported as `None`; the gate decides what that means.

use axum::http::{HeaderMap, header};

use crate::services::auth::cookies;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `Authorization: Bearer <token>`
    BearerHeader,
    /// The `token` cookie.
    Cookie,
}

/// Where a renewed credential is attached on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryChannels {
    /// `Authorization: Bearer <token>` response header.
    pub header: bool,
    /// `token` field merged into JSON object bodies.
    pub json_body: bool,
    /// Fresh `token` / `user_id` cookies.
    pub cookie: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteFamily {
    pub source: CredentialSource,
    pub delivery: DeliveryChannels,
}

impl RouteFamily {
    /// API clients holding the credential themselves.
    pub const fn bearer_api() -> Self {
        Self {
            source: CredentialSource::BearerHeader,
            delivery: DeliveryChannels {
                header: true,
                json_body: true,
                cookie: false,
            },
        }
    }

    /// Browser pages riding on the session cookies. Renewal refreshes the
    /// cookies too, otherwise these clients would never see a new credential.
    pub const fn browser() -> Self {
        Self {
            source: CredentialSource::Cookie,
            delivery: DeliveryChannels {
                header: true,
                json_body: false,
                cookie: true,
            },
        }
    }
}

pub fn extract(headers: &HeaderMap, source: CredentialSource) -> Option<String> {
    match source {
        CredentialSource::BearerHeader => bearer_token(headers),
        CredentialSource::Cookie => cookies::credential_from_cookies(headers),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();

    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    parts.next().map(str::to_string)
}
