//! Loan application submission and workflow endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use loanflow_auth::Actor;
use loanflow_core::validation::LoanApplicationInput;
use loanflow_core::ApplicationStatus;

use crate::app::{envelope, errors, services::AppServices};
use crate::middleware::{require_admin, require_verifier};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

/// The unauthenticated surface: public submission.
pub fn public_router() -> Router {
    Router::new().route("/applications/submit", post(submit))
}

/// Everything behind the auth middleware. Per-route role gates mirror the
/// operation table: verify/reject for verifiers, approve/admin-reject for
/// admins, the rest for any authenticated caller.
pub fn protected_router() -> Router {
    Router::new()
        .route("/applications", get(list))
        .route("/applications/stats", get(stats))
        .route("/applications/:id", patch(update_status))
        .route(
            "/applications/:id/verify",
            patch(verify).layer(axum::middleware::from_fn(require_verifier)),
        )
        .route(
            "/applications/:id/reject",
            patch(reject).layer(axum::middleware::from_fn(require_verifier)),
        )
        .route(
            "/applications/:id/approve",
            patch(approve).layer(axum::middleware::from_fn(require_admin)),
        )
        .route(
            "/applications/:id/admin-reject",
            patch(admin_reject).layer(axum::middleware::from_fn(require_admin)),
        )
}

/// POST /applications/submit - public loan application intake.
pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(input): Json<LoanApplicationInput>,
) -> Response {
    let origin = client_origin(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    match services.submit_application(input, origin).await {
        Ok(receipt) => envelope::success(
            StatusCode::CREATED,
            "Application submitted successfully",
            receipt,
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /applications - role-filtered listing.
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> Response {
    match services
        .list_applications(&actor, query.status.as_deref())
        .await
    {
        Ok(apps) => envelope::success(StatusCode::OK, "Applications fetched successfully", apps),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /applications/stats - dashboard aggregate.
pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.dashboard_stats().await {
        Ok(stats) => envelope::success(
            StatusCode::OK,
            "Dashboard statistics fetched successfully",
            stats,
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PATCH /applications/:id/verify - verifier approves the screening step.
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    match services.verify_application(&id, &actor).await {
        Ok(app) => envelope::success(StatusCode::OK, "Application verified successfully", app),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PATCH /applications/:id/reject - verifier rejects a pending application.
pub async fn reject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> Response {
    let reason = body.and_then(|Json(b)| b.rejection_reason);
    match services.reject_application(&id, reason, &actor).await {
        Ok(app) => envelope::success(StatusCode::OK, "Application rejected successfully", app),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PATCH /applications/:id/approve - admin approval.
pub async fn approve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    match services.approve_application(&id, &actor).await {
        Ok(app) => envelope::success(StatusCode::OK, "Application approved successfully", app),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PATCH /applications/:id/admin-reject - final admin rejection.
pub async fn admin_reject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> Response {
    let reason = body.and_then(|Json(b)| b.rejection_reason);
    match services.admin_reject_application(&id, reason, &actor).await {
        Ok(app) => envelope::success(StatusCode::OK, "Application rejected by admin", app),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PATCH /applications/:id - administrative status override.
///
/// Protected but not role-gated; bypasses transition preconditions and
/// actor stamping.
pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Response {
    match services.override_status(&id, body.status).await {
        Ok(app) => envelope::success(
            StatusCode::OK,
            "Application status updated successfully",
            app,
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_header_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        let peer: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        assert_eq!(client_origin(&headers, Some(peer)), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_peer_then_unknown() {
        let peer: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        assert_eq!(client_origin(&HeaderMap::new(), Some(peer)), "127.0.0.1");
        assert_eq!(client_origin(&HeaderMap::new(), None), "unknown");
    }
}
