use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid token")]
    InvalidToken,

    #[error("missing required scope: {scope}")]
    Forbidden { scope: String },

    #[error("domain {0} already exists")]
    DomainExists(String),

    #[error("domain {0} not found")]
    DomainNotFound(String),

    #[error("realm {0} not found")]
    RealmNotFound(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("provider rejected operation: {0}")]
    Provider(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_token",
                "could not validate credentials".to_string(),
            ),
            AppError::Forbidden { scope } => (
                StatusCode::FORBIDDEN,
                "permission_error",
                "insufficient_scope",
                format!("not enough permissions: scope '{}' required", scope),
            ),
            AppError::DomainExists(name) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "domain_exists",
                format!("domain with name {} already exists", name),
            ),
            AppError::DomainNotFound(name) => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "domain_not_found",
                format!("domain {} not found", name),
            ),
            AppError::RealmNotFound(name) => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "realm_not_found",
                format!("realm not found or inaccessible: {}", name),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_failed",
                msg.clone(),
            ),
            AppError::Provider(msg) => (
                StatusCode::BAD_REQUEST,
                "provider_error",
                "provider_rejected",
                format!("identity provider error: {}", msg),
            ),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "upstream_failed",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        let mut response = (status, body).into_response();

        // Bearer challenge on auth failures, per RFC 6750
        if matches!(self, AppError::InvalidToken | AppError::Forbidden { .. }) {
            response.headers_mut().insert(
                "www-authenticate",
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}
