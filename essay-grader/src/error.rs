//! Error types for essay-grader
//!
//! Authentication failures map to 401 with `WWW-Authenticate: Bearer`.
//! Everything else that reaches a handler is a 500 carrying the error message.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use essay_common::api::{AuthError, ErrorResponse};
use thiserror::Error;

use crate::evaluation::EvaluationError;
use crate::llm::LlmError;

/// Message returned for every token validation failure
pub const INVALID_CREDENTIALS_DETAIL: &str = "Could not validate credentials";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, expired or otherwise invalid credentials (401)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Evaluation pipeline failure (500)
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// LLM call failure outside the pipeline (500)
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// essay-common error (500)
    #[error(transparent)]
    Common(#[from] essay_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => {
                let detail = match err {
                    AuthError::BadCredentials => err.to_string(),
                    _ => INVALID_CREDENTIALS_DETAIL.to_string(),
                };
                (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(ErrorResponse::new(detail)),
                )
                    .into_response()
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(other.to_string())),
            )
                .into_response(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_unauthorized_with_challenge() {
        for err in [AuthError::MissingToken, AuthError::Expired, AuthError::BadCredentials] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        }
    }

    #[test]
    fn test_llm_and_common_errors_are_internal() {
        let llm = ApiError::from(LlmError::Timeout { timeout_ms: 5 }).into_response();
        assert_eq!(llm.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let common = ApiError::from(essay_common::Error::Config("bad".to_string())).into_response();
        assert_eq!(common.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
