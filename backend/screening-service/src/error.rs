/// Error types for Screening Service
///
/// Record store and blob storage failures propagate unchanged up to the HTTP
/// layer, where they are converted to JSON error responses.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepoError;
use crate::services::storage::StorageError;

/// Result type for screening-service handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Raised by the upload body stream once it exceeds the configured limit.
#[derive(Error, Debug)]
#[error("upload exceeds {limit} bytes")]
pub struct UploadTooLarge {
    pub limit: usize,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Record store unreachable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Blob storage could not persist the upload
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// Upload body over the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub code: &'static str,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::SaveFailed(_) => "SAVE_FAILED",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::BadRequest(_) => "INVALID_REQUEST",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SaveFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.to_string(),
            status: status.as_u16(),
            code: self.code(),
        };

        HttpResponse::build(status).json(response)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Stream(ref io_err)
                if io_err
                    .get_ref()
                    .is_some_and(|inner| inner.is::<UploadTooLarge>()) =>
            {
                AppError::PayloadTooLarge(io_err.to_string())
            }
            StorageError::InvalidKey(key) => {
                AppError::BadRequest(format!("invalid invite id for storage key {:?}", key))
            }
            other => AppError::SaveFailed(other.to_string()),
        }
    }
}
