//! Access-control middleware.
//!
//! `auth_middleware` turns a bearer token into a verified [`Actor`] request
//! extension exactly once; the role gates then check that extension. Every
//! rejection is an envelope, never a bare status.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use loanflow_auth::{Actor, TokenVerifier};

use crate::app::envelope;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Verify the bearer token and attach the caller's identity.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return envelope::error(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    match state.verifier.verify(token, Utc::now()) {
        Ok(claims) => {
            req.extensions_mut().insert(Actor::from(claims));
            next.run(req).await
        }
        // One generic message for bad signature, malformed payload, and
        // expiry alike.
        Err(_) => envelope::error(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
    }
}

/// Gate: admin only.
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<Actor>() {
        Some(actor) if actor.is_admin() => next.run(req).await,
        Some(_) => envelope::error(StatusCode::FORBIDDEN, "Admin access required"),
        None => envelope::error(StatusCode::UNAUTHORIZED, "User not authenticated"),
    }
}

/// Gate: verifier or admin.
pub async fn require_verifier(req: Request, next: Next) -> Response {
    match req.extensions().get::<Actor>() {
        Some(actor) if actor.is_verifier() || actor.is_admin() => next.run(req).await,
        Some(_) => envelope::error(StatusCode::FORBIDDEN, "Verifier or Admin access required"),
        None => envelope::error(StatusCode::UNAUTHORIZED, "User not authenticated"),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers_with("Basic abc")), None);
        assert_eq!(extract_bearer(&headers_with("Bearer ")), None);
    }
}
