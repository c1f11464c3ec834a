//! Application assembly: routers, services, envelope, error mapping.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, routing::get, Router};
use tower::ServiceBuilder;

use crate::middleware::{auth_middleware, AuthState};

pub mod dto;
pub mod envelope;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full router.
///
/// Public surface: health, register/login, application submission.
/// Everything else sits behind the token middleware, with per-route role
/// gates on the workflow transitions.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        verifier: services.token_verifier(),
    };

    let protected = Router::new()
        .merge(routes::applications::protected_router())
        .merge(routes::users::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", routes::auth::router())
        .merge(routes::applications::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
