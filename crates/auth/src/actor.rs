//! Verified caller identity.

use loanflow_core::{Role, UserId};

use crate::claims::Claims;

/// The identity the access-control middleware attaches to a request after
/// token verification.
///
/// Built exactly once per request from verified claims and passed explicitly
/// to services; downstream code never re-reads raw token payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_verifier(&self) -> bool {
        self.role == Role::Verifier
    }
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}
