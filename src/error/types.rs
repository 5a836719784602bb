use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::current_request_id;

use super::kinds::{DispatchError, ExtractionError, ValidationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File too large: {size}MB exceeds limit of {limit}MB")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Upload exceeds the size limit of {limit}MB")]
    BodyTooLarge { limit: usize },

    #[error("Invalid file format: {message}")]
    InvalidFile { message: String },

    #[error("Rate limit exceeded: maximum concurrent requests reached")]
    RateLimitExceeded,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Missing or invalid content type")]
    InvalidContentType,

    #[error("Missing file in request")]
    MissingFile,

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::FileTooLarge { .. } | AppError::BodyTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::InvalidFile { .. } => "INVALID_FILE",
            AppError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Dispatch(DispatchError::RateLimited { .. }) => "UPSTREAM_RATE_LIMITED",
            AppError::Dispatch(DispatchError::Timeout) => "UPSTREAM_TIMEOUT",
            AppError::Dispatch(err) if err.is_retryable() => "UPSTREAM_UNAVAILABLE",
            AppError::Dispatch(_) => "UPSTREAM_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidContentType => "INVALID_CONTENT_TYPE",
            AppError::MissingFile => "MISSING_FILE",
            AppError::Internal { .. } => "INTERNAL_ERROR",
            AppError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::FileTooLarge { .. } | AppError::BodyTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::InvalidFile { .. } => StatusCode::BAD_REQUEST,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Dispatch(DispatchError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Dispatch(err) if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Dispatch(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidContentType => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when repeating the same action later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Dispatch(err) => err.is_retryable(),
            AppError::RateLimitExceeded => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let retryable = self.is_retryable();
        let request_id =
            current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = chrono::Utc::now().to_rfc3339();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                request_id = %request_id,
                error_message = %message,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                request_id = %request_id,
                error_message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "retryable": retryable,
                "request_id": request_id,
                "timestamp": timestamp
            },
            "data": null
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::InvalidBody(rejection.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("Background task failed: {}", err),
        }
    }
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        AppError::InvalidFile {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
