//! Registration and login.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};

use loanflow_core::validation::{LoginInput, NewUserInput};

use crate::app::{envelope, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /auth/register - create an account (public).
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(input): Json<NewUserInput>,
) -> Response {
    match services.create_user(input).await {
        Ok(user) => envelope::success(StatusCode::CREATED, "User registered successfully", user),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /auth/login - authenticate and issue a session token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(input): Json<LoginInput>,
) -> Response {
    match services.login(input).await {
        Ok(data) => envelope::success(StatusCode::OK, "Login successful", data),
        Err(e) => errors::domain_error_to_response(e),
    }
}
