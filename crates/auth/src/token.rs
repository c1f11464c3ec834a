//! HS256 token signing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use loanflow_core::{Role, UserId};

use crate::claims::{validate_claims, Claims, ClaimsError};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed payload, or rejected claims. Collapsed into
    /// one variant so callers cannot leak why verification failed.
    #[error("invalid token")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("token encoding failed: {0}")]
    Encode(String),
}

impl From<ClaimsError> for TokenError {
    fn from(err: ClaimsError) -> Self {
        match err {
            ClaimsError::Expired => TokenError::Expired,
            ClaimsError::NotYetValid | ClaimsError::InvalidTimeWindow => TokenError::Invalid,
        }
    }
}

/// Verifier seam used by the access-control middleware.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}

/// HS256 codec over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed token for an authenticated user.
    pub fn issue(
        &self,
        sub: UserId,
        email: &str,
        role: Role,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl TokenVerifier for Hs256TokenCodec {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        // Expiry is checked by `validate_claims` against the injected clock,
        // so the library's wall-clock checks stay off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = std::collections::HashSet::new();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
