//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
///
/// Every variant maps to one HTTP status class; handlers raise the typed
/// variant and the `IntoResponse` impl renders the uniform
/// `{"success": false, "message": ...}` body.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential
    #[error("{0}")]
    Unauthorized(String),

    /// Role, ownership, lock, or subscription check failed
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique field or conflicting state
    #[error("{0}")]
    Conflict(String),

    /// Caller exceeded the request rate
    #[error("{0}")]
    RateLimited(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

/// Whether a database error came from a unique index.
///
/// Those surface as conflicts, not server errors: two signups racing on
/// one email, or two products landing on one slug.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl From<anyhow::Error> for ApiError {
    /// Repositories return `anyhow::Result`; unwrap a wrapped sqlx error
    /// so constraint violations keep their status mapping.
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(db) => ApiError::Database(db),
            Err(other) => ApiError::Internal(other),
        }
    }
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ApiError::Database(e) if is_unique_violation(e) => {
                "A record with this value already exists".to_string()
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::RateLimited("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_anyhow_wrapped_sqlx_error_keeps_database_variant() {
        let err: ApiError = anyhow::Error::new(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, ApiError::Database(_)));

        let err: ApiError = anyhow::anyhow!("something else").into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
