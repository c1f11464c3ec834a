//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error taxonomy.
///
/// Every failure the API can surface maps onto exactly one of these
/// variants; the HTTP layer owns the status-code mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed shape/range validation. Carries the per-field messages.
    #[error("validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    /// Missing/invalid/expired token or bad credentials.
    ///
    /// The message is deliberately generic so a caller cannot distinguish
    /// an unknown email from a wrong password.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but the caller's role does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated (duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A status transition was attempted from an illegal pre-state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A well-formed request the service refuses (e.g. an admin deleting
    /// their own account).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Store or configuration failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(errors: Vec<String>) -> Self {
        Self::ValidationFailed(errors)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
