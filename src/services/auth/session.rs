use chrono::{DateTime, Utc};

use crate::services::auth::{
    cookies::CookiePolicy,
    renewal::{RenewalGuard, RenewalOutcome},
    token::{Credential, SessionIdentity, TokenError, TokenSigner, VerifiedSession},
};

/// Orchestrates the session lifecycle: issuance at login/registration,
/// verification on protected routes, sliding renewal, and the cookie policy
/// used to deliver credentials.
///
/// Shared read-only across requests (wrapped in `Arc` inside `AppState`).
#[derive(Clone, Debug)]
pub struct SessionService {
    signer: TokenSigner,
    renewal: RenewalGuard,
    cookies: CookiePolicy,
}

impl SessionService {
    pub fn new(signer: TokenSigner, renewal: RenewalGuard, cookies: CookiePolicy) -> Self {
        Self {
            signer,
            renewal,
            cookies,
        }
    }

    pub fn issue(&self, identity: &SessionIdentity) -> Result<Credential, TokenError> {
        self.signer.issue(identity)
    }

    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedSession, TokenError> {
        self.signer.verify_at(token, now)
    }

    pub fn renew_if_due(&self, session: &VerifiedSession, now: DateTime<Utc>) -> RenewalOutcome {
        self.renewal.evaluate(&self.signer, session, now)
    }

    pub fn cookies(&self) -> &CookiePolicy {
        &self.cookies
    }
}

#[cfg(test)]
impl SessionService {
    /// Backdated issuance for driving the pipeline near expiry.
    pub fn issue_at(
        &self,
        identity: &SessionIdentity,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        self.signer.issue_at(identity, now)
    }
}
