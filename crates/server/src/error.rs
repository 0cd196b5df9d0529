//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`,
//! and every error reaches the client as `{ "error": message }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AccountError, CheckoutError, HistoryError, InventoryError};

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// Account operation failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Inventory operation failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Cart or checkout operation failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// History operation failed.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not logged in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks the required permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repository(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Account(err) => match err {
                AccountError::MissingFields
                | AccountError::PasswordMismatch
                | AccountError::PasswordTooShort
                | AccountError::InvalidUsername(_)
                | AccountError::SuperAdminRole => StatusCode::BAD_REQUEST,
                AccountError::UsernameTaken | AccountError::AlreadyActive => StatusCode::CONFLICT,
                AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AccountError::PendingApproval
                | AccountError::CannotDeleteSuperAdmin
                | AccountError::WouldRemoveSuperAdmin
                | AccountError::Forbidden(_) => StatusCode::FORBIDDEN,
                AccountError::NotFound => StatusCode::NOT_FOUND,
                AccountError::Repository(_) | AccountError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Inventory(err) => match err {
                InventoryError::Forbidden => StatusCode::FORBIDDEN,
                InventoryError::EmptyName
                | InventoryError::DuplicateName(_)
                | InventoryError::NegativePrice(_) => StatusCode::BAD_REQUEST,
                InventoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::InvalidQuantity | CheckoutError::EmptyCart => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::ProductNotFound(_) | CheckoutError::NotInCart(_) => {
                    StatusCode::NOT_FOUND
                }
                CheckoutError::InsufficientStock { .. } | CheckoutError::DeductionFailed(_) => {
                    StatusCode::CONFLICT
                }
                CheckoutError::Forbidden => StatusCode::FORBIDDEN,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::History(err) => match err {
                HistoryError::Forbidden | HistoryError::SuperAdminOnly => StatusCode::FORBIDDEN,
                HistoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the client.
    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            // Don't expose internal error details to clients
            return "Internal server error".to_string();
        }
        match self {
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
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
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the logged-in account.
pub fn set_sentry_user(account_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
