//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error response has the body `{"success": false, "error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::admin_config::AdminConfigError;
use crate::db::RepositoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Reading the admin configuration failed.
    #[error("Admin config error: {0}")]
    AdminConfig(#[from] AdminConfigError),

    /// Entity lookup missed. Holds the entity name, e.g. "User".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Registration with an email that is already taken.
    #[error("User already exists")]
    DuplicateUser,

    /// The admin has no configuration document.
    #[error("Admin configuration not found")]
    ConfigNotFound,

    /// An identifier in the path could not be parsed.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::ConfigNotFound => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Cart(_)) | Self::DuplicateUser | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_) | Self::AdminConfig(_) | Self::InvalidId(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients.
    fn client_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::Cart(e)) => e.to_string(),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::AdminConfig(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
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
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bunny_shop_core::CartError;
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product");
        assert_eq!(err.to_string(), "Product not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(get_status(AppError::NotFound("User")), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::ConfigNotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::DuplicateUser), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::InvalidId("abc".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Cart(
                CartError::TotalOverflow
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let body = body_json(AppError::NotFound("User").into_response()).await;
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "error": "User not found" })
        );

        let body = body_json(AppError::DuplicateUser.into_response()).await;
        assert_eq!(body["error"], "User already exists");
    }

    #[tokio::test]
    async fn test_cart_overflow_is_reported_to_client() {
        let err = AppError::from(RepositoryError::from(CartError::QuantityOverflow(
            "p1".to_string(),
        )));
        let body = body_json(err.into_response()).await;
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": "quantity for product p1 is out of range"
            })
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "invalid order status: bogus".to_string(),
        ));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
