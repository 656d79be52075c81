//! Session cookies: the credential and the user's id travel as a pair.
//!
//! Both are readable from script (no HttpOnly), `SameSite=Lax`, `Path=/`,
//! and `Secure` only in production.

use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::AppEnv;
use crate::services::auth::token::Credential;

pub const CREDENTIAL_COOKIE: &str = "token";
pub const USER_ID_COOKIE: &str = "user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn for_env(app_env: AppEnv) -> Self {
        Self::new(app_env.is_production())
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(false)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    pub fn session_cookies(&self, credential: &Credential) -> [Cookie<'static>; 2] {
        [
            self.cookie(CREDENTIAL_COOKIE, credential.as_str().to_string()),
            self.cookie(USER_ID_COOKIE, credential.identity().user_id.to_string()),
        ]
    }

    pub fn removal_cookies(&self) -> [Cookie<'static>; 2] {
        [CREDENTIAL_COOKIE, USER_ID_COOKIE].map(|name| {
            let mut cookie = self.cookie(name, String::new());
            cookie.make_removal();
            cookie
        })
    }

    /// Issuance path (login/registration): stage both cookies on a jar.
    pub fn issue(&self, jar: CookieJar, credential: &Credential) -> CookieJar {
        let [token, user] = self.session_cookies(credential);
        jar.add(token).add(user)
    }

    /// Renewal path: append `Set-Cookie` headers to an already built response.
    pub fn append_session_cookies(&self, headers: &mut HeaderMap, credential: &Credential) {
        for cookie in self.session_cookies(credential) {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(e) => {
                    tracing::warn!(cookie = cookie.name(), error = %e, "unencodable session cookie");
                }
            }
        }
    }
}

/// Raw credential from the `token` cookie, if any.
pub fn credential_from_cookies(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(CREDENTIAL_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}
