//! Error types for libris-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Body text for every 500 response. The real cause goes to the log only.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// A single failed validation rule, reported with the JSON field name
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub property: String,
    pub message: String,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Request payload failed validation (400)
    #[error("Validation failed")]
    Validation(Vec<Violation>),

    /// Missing or unknown bearer token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// libris-common error
    #[error("Common error: {0}")]
    Common(#[from] libris_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Validation carries a violation list alongside the error envelope
        if let ApiError::Validation(violations) = self {
            let body = Json(json!({
                "error": {
                    "code": "VALIDATION_FAILED",
                    "message": "Validation failed",
                },
                "errors": violations,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(_) => unreachable!("handled above"),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            // Server-side failures: the detail is logged, never sent to the client
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                internal_response()
            }
            ApiError::Other(err) => {
                error!("Internal error: {:#}", err);
                internal_response()
            }
            ApiError::Common(err) => {
                error!("Internal error: {}", err);
                internal_response()
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn internal_response() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Map a garde report into the wire-format violation list
pub fn violations_from_report(report: &garde::Report) -> Vec<Violation> {
    report
        .iter()
        .map(|(path, error)| Violation {
            property: wire_field_name(&path.to_string()),
            message: error.to_string(),
        })
        .collect()
}

/// Error paths carry Rust field names; clients see the JSON field names
fn wire_field_name(path: &str) -> String {
    match path {
        "first_name" => "firstName".to_string(),
        "cover_text" => "coverText".to_string(),
        "id_author" => "idAuthor".to_string(),
        other => other.to_string(),
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
