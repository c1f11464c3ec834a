//! User management endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};

use loanflow_auth::Actor;
use loanflow_core::validation::NewUserInput;

use crate::app::{envelope, errors, services::AppServices};
use crate::middleware::require_admin;

pub fn router() -> Router {
    let admin_routes = Router::new()
        .route("/users", get(list_users).post(add_user))
        .route("/users/:id", delete(delete_user))
        .route_layer(axum::middleware::from_fn(require_admin));

    Router::new()
        .route("/users/profile", get(profile))
        .merge(admin_routes)
}

/// GET /users - all users, password hashes excluded (admin only).
pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.list_users().await {
        Ok(users) => envelope::success(StatusCode::OK, "Users fetched successfully", users),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /users - provision a user (admin only).
pub async fn add_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(input): Json<NewUserInput>,
) -> Response {
    match services.create_user(input).await {
        Ok(user) => envelope::success(StatusCode::CREATED, "User created successfully", user),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// DELETE /users/:id - remove a user (admin only; never oneself).
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    match services.delete_user(&actor, &id).await {
        Ok(deleted) => envelope::success(StatusCode::OK, "User deleted successfully", deleted),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /users/profile - the caller's own public fields.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Actor>,
) -> Response {
    match services.profile(&actor).await {
        Ok(user) => envelope::success(StatusCode::OK, "Profile fetched successfully", user),
        Err(e) => errors::domain_error_to_response(e),
    }
}
