//! # API Errors
//!
//! Maps storefront and token errors onto JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orbit_auth::TokenError;
use orbit_core::StorefrontError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Error returned by handlers and middleware
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Storefront(err) => err.status_code(),
            ApiError::Token(TokenError::Signing(_)) => 500,
            ApiError::Token(_) => 403,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = ErrorResponse::new(self.to_string(), status.as_u16());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
