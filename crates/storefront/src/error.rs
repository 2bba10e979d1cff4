//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use teslix_core::Locale;

use crate::db::RepositoryError;
use crate::services::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order submission failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Checkout or lookup request failed; the customer sees a localized
    /// retry prompt instead of the raw reason.
    #[error("Submission error ({1}): {0}")]
    Submission(OrderError, Locale),

    /// A collaborator the request needs is not configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Order(OrderError::Delivery(_)) | Self::Submission(OrderError::Delivery(_), _) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Order(OrderError::EmptyMessage | OrderError::EmptyCart)
            | Self::Submission(OrderError::EmptyMessage | OrderError::EmptyCart, _)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Configuration(_) => "Server configuration error".to_string(),
            Self::Order(OrderError::Delivery(_)) => "Failed to send message".to_string(),
            Self::Order(err) => err.to_string(),
            Self::Submission(OrderError::Delivery(_), locale) => retry_message(*locale).to_string(),
            Self::Submission(err, _) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Configuration(_)
                | Self::Order(OrderError::Delivery(_))
                | Self::Submission(OrderError::Delivery(_), _)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

const fn retry_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Не удалось отправить заявку. Попробуйте ещё раз или напишите нам напрямую.",
        Locale::Uk => "Не вдалося надіслати заявку. Спробуйте ще раз або напишіть нам напряму.",
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
