use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Who a session credential speaks for.
///
/// `email` is the credential subject; `user_id` travels alongside it so
/// handlers do not need a lookup to address the user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub email: String,
    pub user_id: Uuid,
}

impl SessionIdentity {
    pub fn new(email: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            email: email.into(),
            user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    uid: Uuid,
    iat: i64,
    exp: i64,
}

/// A signed, time-limited session token. Never mutated after issuance.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    identity: SessionIdentity,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token is a bearer secret; keep it out of logs.
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub identity: SessionIdentity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedSession {
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        self.expires_at - now
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("expired credential")]
    ExpiredCredential,
    #[error("failed to sign credential: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// HS256 signer/verifier bound to the process-wide secret.
///
/// Expiry is checked here against a caller-supplied `now` (zero leeway)
/// instead of inside `jsonwebtoken`, so one clock drives both verification
/// and the renewal decision.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn issue(&self, identity: &SessionIdentity) -> Result<Credential, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &SessionIdentity,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        // JWT timestamps are whole seconds; keep `expires_at` aligned with `exp`.
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at + self.ttl;

        let claims = SessionClaims {
            sub: identity.email.clone(),
            uid: identity.user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(Credential {
            token,
            identity: identity.clone(),
            expires_at,
        })
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedSession, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(kind = ?e.kind(), "credential rejected by decoder");
                TokenError::InvalidCredential
            })?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::InvalidCredential);
        }

        let issued_at =
            DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::InvalidCredential)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidCredential)?;

        if expires_at <= now {
            return Err(TokenError::ExpiredCredential);
        }

        Ok(VerifiedSession {
            identity: SessionIdentity {
                email: claims.sub,
                user_id: claims.uid,
            },
            issued_at,
            expires_at,
        })
    }
}
