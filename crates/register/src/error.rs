//! Unified error handling for the register API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::documents::DocumentError;
use crate::import::ImportError;
use crate::payment::PaymentError;
use crate::services::CreditError;
use crate::users::UserError;
use crate::voice::SpeechError;

/// Application-level error type for the register.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout rejected the operation.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Credit repayment rejected.
    #[error("Credit error: {0}")]
    Credit(#[from] CreditError),

    /// Document rendering failed.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Bulk import failed.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// User directory operation failed.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// Speech recognition failed.
    #[error("Voice error: {0}")]
    Speech(#[from] SpeechError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission. `redirect` is where the client should go instead.
    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        redirect: &'static str,
    },

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

fn catalog_status(error: &CatalogError) -> StatusCode {
    match error {
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::Conflict(_) | CatalogError::InvalidTransition { .. } => StatusCode::CONFLICT,
        CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn payment_status(error: &PaymentError) -> StatusCode {
    match error {
        PaymentError::Declined(_) => StatusCode::PAYMENT_REQUIRED,
        PaymentError::Aborted => StatusCode::CONFLICT,
        PaymentError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(e) | Self::Checkout(CheckoutError::Catalog(e)) => catalog_status(e),
            Self::Credit(CreditError::Catalog(e)) | Self::Import(ImportError::Catalog(e)) => {
                catalog_status(e)
            }
            Self::Checkout(CheckoutError::Payment(e)) => payment_status(e),
            Self::Checkout(
                CheckoutError::CustomerNotFound(_) | CheckoutError::OrderNotFound(_),
            )
            | Self::Credit(CreditError::CustomerNotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Checkout(CheckoutError::UnknownPaymentMethod(_) | CheckoutError::Cart(_))
            | Self::Credit(CreditError::NonPositiveAmount(_) | CreditError::ExceedsBalance { .. })
            | Self::Import(ImportError::Csv(_))
            | Self::User(UserError::InvalidUsername(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(
                CheckoutError::EmptyCart
                | CheckoutError::CartNotEmpty
                | CheckoutError::InvalidState { .. }
                | CheckoutError::NotHeld { .. },
            )
            | Self::User(UserError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::Speech(SpeechError::Unsupported) => StatusCode::NOT_IMPLEMENTED,
            Self::Speech(SpeechError::Recognizer(_)) => StatusCode::BAD_GATEWAY,
            Self::User(UserError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Checkout(CheckoutError::Document(_))
            | Self::Document(_)
            | Self::Import(ImportError::Io(_))
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Register request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else if status.is_server_error() {
            "Service unavailable".to_string()
        } else {
            self.to_string()
        };

        let body = match &self {
            Self::Forbidden { redirect, .. } => json!({ "error": message, "redirect": redirect }),
            _ => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context for the acting register user.
pub fn set_sentry_user(user_id: i32, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}
