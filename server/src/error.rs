//! API error type mapped to HTTP status codes.
//!
//! Every error renders as a JSON body `{"error": "message"}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

/// Handler error.
///
/// - `BadRequest` → 400
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or out-of-range parameter (400).
    BadRequest(String),
    /// Pipeline failure (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
