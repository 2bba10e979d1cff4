//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use teslix_core::ValidationError;

use crate::db::RepositoryError;
use crate::services::{IntakeError, UploadError};

/// Application-level error type for the admin service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Submitted listing failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Single-file upload failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Batch intake aborted.
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for admin handlers.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_)
            | Self::Internal(_)
            | Self::Upload(UploadError::Storage(_) | UploadError::Processing(_))
            | Self::Intake(IntakeError::Upload {
                source: UploadError::Storage(_) | UploadError::Processing(_),
                ..
            }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upload(UploadError::Unauthorized) | Self::Intake(IntakeError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Upload(_) | Self::Intake(IntakeError::Upload { .. }) => StatusCode::BAD_GATEWAY,
            Self::Validation(_) | Self::Intake(IntakeError::CapReached) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Upload(UploadError::Unauthorized) | Self::Intake(IntakeError::Unauthorized) => {
                "Unauthorized".to_string()
            }
            Self::Upload(_) => "Upload failed".to_string(),
            Self::Intake(IntakeError::Upload { file, .. }) => format!("Upload failed: {file}"),
            Self::Intake(err) => err.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BlobError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationError::NoImages)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("p1".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Intake(IntakeError::CapReached)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Intake(IntakeError::Unauthorized)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Upload(UploadError::Storage(BlobError::NameExhausted(
                "a.jpg".to_string()
            )))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Intake(IntakeError::Upload {
                file: "a.jpg".to_string(),
                source: UploadError::Rejected {
                    status: 503,
                    message: "busy".to_string(),
                },
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Validation(ValidationError::MissingField("title"));
        assert_eq!(err.public_message(), "missing required field: title");
    }
}
