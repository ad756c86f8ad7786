//! Response envelope and error handling for API endpoints
//!
//! Every endpoint answers with `{succeeded, data, messages}`. Expected
//! failures (validation, not-found, data-access) come back as a failed
//! envelope with HTTP 200; requests rejected before the handler runs and
//! unexpected errors map to an HTTP status with the same envelope body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ident_common::AppError;
use ident_service::{DenyReason, ServiceError, ServiceResult};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub succeeded: bool,
    pub data: Option<T>,
    pub messages: Vec<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            succeeded: true,
            data: Some(data),
            messages: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            data: None,
            messages: vec![message.into()],
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Type alias for API results: a success/failure envelope, or an HTTP error
pub type ApiResult<T> = Result<Envelope<T>, ApiError>;

/// Map a service result into the envelope, keeping expected failures at 200
pub fn respond<T>(result: ServiceResult<T>) -> ApiResult<T> {
    match result {
        Ok(data) => Ok(Envelope::success(data)),
        Err(e) if e.is_expected_failure() => Ok(Envelope::failure(e.to_string())),
        Err(e) => Err(ApiError::Service(e)),
    }
}

/// API error type for requests that fail outside the envelope-at-200 path
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    App(#[from] AppError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Invalid authorization header format")]
    InvalidAuthFormat,

    #[error("Access denied")]
    AccessDenied(DenyReason),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::App(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Validation(_) | Self::InvalidPath(_) | Self::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingAuth | Self::InvalidAuthFormat => StatusCode::UNAUTHORIZED,
            Self::AccessDenied(reason) => match reason {
                DenyReason::NotPermitted | DenyReason::EvaluationFailed => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Service(e) => e.error_code(),
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
            Self::MissingAuth => "MISSING_AUTHORIZATION",
            Self::InvalidAuthFormat => "INVALID_AUTHORIZATION_FORMAT",
            Self::AccessDenied(reason) => reason.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        // Log server errors
        if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
        }

        let mut body = Envelope::<serde_json::Value>::failure(self.to_string());
        body.messages.push(code);

        (status, Json(body)).into_response()
    }
}
