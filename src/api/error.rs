use crate::error::ChirpyError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Handler failures, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(String),
    Conflict(String),
    Internal(ChirpyError),
}

impl From<ChirpyError> for ApiError {
    fn from(err: ChirpyError) -> Self {
        match err {
            ChirpyError::NotFound(what) => ApiError::NotFound(what),
            ChirpyError::EmailExists => ApiError::Conflict("Email already exists".to_string()),
            ChirpyError::NotAuthorized => ApiError::Forbidden,
            // Every token failure looks the same to the client
            e if e.is_unauthenticated() => ApiError::Unauthorized,
            e => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You are not authorized to do that".to_string(),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
