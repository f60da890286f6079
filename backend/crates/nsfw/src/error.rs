//! Gate Error Types
//!
//! This module provides gate-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. Every variant renders a
//! JSON body with a machine-readable `code` the upload client matches on.

use crate::domain::entities::Category;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use serde_json::json;
use thiserror::Error;

/// Gate-specific result type alias
pub type NsfwResult<T> = Result<T, NsfwError>;

pub const CODE_NO_IMAGE: &str = "NO_IMAGE";
pub const CODE_INVALID_FILE_TYPE: &str = "INVALID_FILE_TYPE";
pub const CODE_NSFW_CONTENT_DETECTED: &str = "NSFW_CONTENT_DETECTED";
pub const CODE_FILE_TOO_LARGE: &str = "FILE_TOO_LARGE";
pub const CODE_RATE_LIMITED: &str = "RATE_LIMITED";
pub const CODE_VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Gate-specific error variants
#[derive(Debug, Error)]
pub enum NsfwError {
    /// No `file` field in the upload
    #[error("No image file provided")]
    NoImage,

    /// Upload declared a non-image MIME type
    #[error("File must be an image (got {0})")]
    InvalidFileType(String),

    /// Caller exhausted the current window
    #[error("Too many requests. Please try again later.")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// Decision engine rejected the image
    #[error("Image failed content validation")]
    ContentRejected { category: Category, confidence: f64 },

    /// Upload body exceeded the transport limit
    #[error("Upload exceeds the request size limit")]
    PayloadTooLarge,

    /// Multipart stream could not be read
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// Rate limit backend failure
    #[error("Rate limit error: {0}")]
    RateLimit(#[from] platform::rate_limit::RateLimitError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NsfwError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NsfwError::NoImage | NsfwError::InvalidFileType(_) => ErrorKind::BadRequest,
            NsfwError::RateLimitExceeded { .. } => ErrorKind::TooManyRequests,
            NsfwError::ContentRejected { .. } => ErrorKind::Forbidden,
            NsfwError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            NsfwError::Multipart(_) | NsfwError::RateLimit(_) | NsfwError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            NsfwError::NoImage => CODE_NO_IMAGE,
            NsfwError::InvalidFileType(_) => CODE_INVALID_FILE_TYPE,
            NsfwError::RateLimitExceeded { .. } => CODE_RATE_LIMITED,
            NsfwError::ContentRejected { .. } => CODE_NSFW_CONTENT_DETECTED,
            NsfwError::PayloadTooLarge => CODE_FILE_TOO_LARGE,
            NsfwError::Multipart(_) | NsfwError::RateLimit(_) | NsfwError::Internal(_) => {
                CODE_VALIDATION_ERROR
            }
        }
    }

    /// Message shown to the client. Server-side failures stay generic.
    pub fn public_message(&self) -> String {
        if self.kind().is_server_error() {
            "Failed to validate image".to_string()
        } else {
            self.to_string()
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            NsfwError::Multipart(msg) => {
                tracing::error!(message = %msg, "Upload multipart error");
            }
            NsfwError::RateLimit(e) => {
                tracing::error!(error = %e, "Rate limit backend error");
            }
            NsfwError::Internal(msg) => {
                tracing::error!(message = %msg, "Gate internal error");
            }
            NsfwError::RateLimitExceeded { .. } => {
                tracing::warn!("Image check rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Image check error");
            }
        }
    }
}

/// Round to two decimals for client-facing confidence values
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

impl From<NsfwError> for AppError {
    fn from(err: NsfwError) -> Self {
        let kind = err.kind();
        let code = err.code();
        let message = err.public_message();
        AppError::new(kind, message).with_code(code).with_source(err)
    }
}

impl IntoResponse for NsfwError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let message = self.public_message();

        match self {
            NsfwError::RateLimitExceeded { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(json!({
                    "error": message,
                    "retryAfter": retry_after_secs,
                })),
            )
                .into_response(),
            NsfwError::ContentRejected {
                category,
                confidence,
            } => (
                status,
                Json(json!({
                    "error": message,
                    "code": CODE_NSFW_CONTENT_DETECTED,
                    "details": {
                        "category": category,
                        "confidence": round_confidence(confidence),
                    },
                })),
            )
                .into_response(),
            other => (
                status,
                Json(json!({
                    "error": message,
                    "code": other.code(),
                })),
            )
                .into_response(),
        }
    }
}
