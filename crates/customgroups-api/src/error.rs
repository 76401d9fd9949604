//! API error type and status mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use customgroups_core::DomainError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::NotSupported(msg) => ApiError::MethodNotAllowed(msg),
            DomainError::AlreadyExists(msg) => ApiError::Conflict(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::ValidationError(msg) => ApiError::BadRequest(msg),
            DomainError::DatabaseError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                ("UNAUTHORIZED", msg)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                ("FORBIDDEN", msg)
            }
            ApiError::NotFound(msg) => ("NOT_FOUND", msg),
            ApiError::MethodNotAllowed(msg) => ("METHOD_NOT_ALLOWED", msg),
            ApiError::Conflict(msg) => ("CONFLICT", msg),
            ApiError::BadRequest(msg) => ("VALIDATION_ERROR", msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DomainError::NotSupported("x".into()), StatusCode::METHOD_NOT_ALLOWED),
            (DomainError::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (DomainError::ValidationError("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::DatabaseError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
