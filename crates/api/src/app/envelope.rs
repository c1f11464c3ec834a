//! Uniform response envelope.
//!
//! Every response, success or failure, is
//! `{success, message, data?, error?, timestamp}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

/// Success envelope with a payload.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

/// Failure envelope.
pub fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

/// Failure envelope with an error detail string.
pub fn error_with_detail(status: StatusCode, message: &str, detail: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "error": detail,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}
