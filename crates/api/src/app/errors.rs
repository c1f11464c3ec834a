//! Domain error → envelope mapping.

use axum::http::StatusCode;
use axum::response::Response;

use loanflow_core::DomainError;

use crate::app::envelope;

/// Convert a service failure into the standard envelope.
///
/// This is the only place status codes are assigned; no failure propagates
/// past the handler boundary.
pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::ValidationFailed(errors) => envelope::error_with_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed",
            &errors.join(", "),
        ),
        DomainError::Unauthorized => {
            envelope::error(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        DomainError::Forbidden(msg) => envelope::error(StatusCode::FORBIDDEN, &msg),
        DomainError::NotFound(msg) => envelope::error(StatusCode::NOT_FOUND, &msg),
        DomainError::Conflict(msg) => envelope::error(StatusCode::CONFLICT, &msg),
        DomainError::InvalidTransition(msg) => envelope::error(StatusCode::BAD_REQUEST, &msg),
        DomainError::BadRequest(msg) => envelope::error(StatusCode::BAD_REQUEST, &msg),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            envelope::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
