//! Token claims model (transport-agnostic).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use loanflow_core::{Role, UserId};

/// Claims embedded in a session token.
///
/// This is the minimal set loanflow expects once a token has been decoded
/// and its signature verified by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's id.
    pub sub: UserId,

    /// Email at issue time (informational; role gating never reads it).
    pub email: String,

    /// Role granted to the caller.
    pub role: Role,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only. Signature verification is the
/// codec's job.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(ClaimsError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(ClaimsError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(ClaimsError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> Claims {
        Claims {
            sub: UserId::new(),
            email: "verifier@example.com".to_string(),
            role: Role::Verifier,
            iat,
            exp,
        }
    }

    #[test]
    fn live_token_validates() {
        let now = Utc::now();
        let c = claims(now.timestamp() - 60, now.timestamp() + 60);
        assert!(validate_claims(&c, now).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let c = claims(now.timestamp() - 120, now.timestamp() - 60);
        assert_eq!(validate_claims(&c, now), Err(ClaimsError::Expired));
    }

    #[test]
    fn future_token_is_rejected() {
        let now = Utc::now();
        let c = claims(now.timestamp() + 60, now.timestamp() + 120);
        assert_eq!(validate_claims(&c, now), Err(ClaimsError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let c = claims(now.timestamp(), now.timestamp());
        assert_eq!(validate_claims(&c, now), Err(ClaimsError::InvalidTimeWindow));
    }
}
