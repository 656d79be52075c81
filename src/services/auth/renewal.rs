//! Sliding-expiration renewal.
//!
//! Runs only after a credential has been verified. If the credential has
//! less than `threshold` left, a replacement is minted for the same identity
//! and handed back as a [`RenewalOutcome`]; the current request keeps using
//! the identity it was authorised with.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::services::auth::token::{
    Credential, SessionIdentity, TokenError, TokenSigner, VerifiedSession,
};

/// Anything that can mint a credential for an identity at a given instant.
pub trait IssueCredential {
    fn issue_at(
        &self,
        identity: &SessionIdentity,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError>;
}

impl IssueCredential for TokenSigner {
    fn issue_at(
        &self,
        identity: &SessionIdentity,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        TokenSigner::issue_at(self, identity, now)
    }
}

/// Per-request renewal result. Lives in the response extensions until the
/// propagator removes it.
#[derive(Debug, Clone, Default)]
pub struct RenewalOutcome {
    pub credential: Option<Credential>,
}

impl RenewalOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn renewed(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    pub fn is_renewed(&self) -> bool {
        self.credential.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenewalGuard {
    threshold: TimeDelta,
}

impl RenewalGuard {
    pub fn new(threshold: TimeDelta) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> TimeDelta {
        self.threshold
    }

    pub fn is_due(&self, session: &VerifiedSession, now: DateTime<Utc>) -> bool {
        session.remaining(now) < self.threshold
    }

    /// Decide and, when due, mint the replacement.
    ///
    /// Signing failures degrade to "no renewal this time": the request that
    /// triggered renewal was already authorised and must still succeed.
    pub fn evaluate(
        &self,
        issuer: &impl IssueCredential,
        session: &VerifiedSession,
        now: DateTime<Utc>,
    ) -> RenewalOutcome {
        if !self.is_due(session, now) {
            return RenewalOutcome::none();
        }

        match issuer.issue_at(&session.identity, now) {
            Ok(credential) => {
                debug!(
                    user_id = %session.identity.user_id,
                    remaining_seconds = session.remaining(now).num_seconds(),
                    new_expires_at = %credential.expires_at(),
                    "session credential renewed"
                );
                RenewalOutcome::renewed(credential)
            }
            Err(err) => {
                warn!(
                    user_id = %session.identity.user_id,
                    error = %err,
                    "session renewal failed; continuing without a new credential"
                );
                RenewalOutcome::none()
            }
        }
    }
}
