use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Common error types used across the application.
///
/// Every variant renders as `{"error": ..., "details"?: ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The portfolio provider answered with a non-success status.
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: String,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::MissingParameter(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::Upstream {
                status,
                message,
                details,
            } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
                Some(details),
            ),
            AppError::Http(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch data from portfolio provider".to_string(),
                Some(e.to_string()),
            ),
            AppError::Decode(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to decode portfolio provider response".to_string(),
                Some(msg),
            ),
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}
