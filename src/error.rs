//! Application error type shared by every layer.
//!
//! The `NotFound` and `Expired` messages are part of the public contract:
//! HTTP collaborators must surface them verbatim, so they are exposed as
//! constants and rendered by the [`IntoResponse`] implementation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Message returned when no token matches the presented value.
pub const TOKEN_NOT_FOUND_MESSAGE: &str = "the token is not found, please request a new token";

/// Message returned when a token exists but is used or past its validity window.
pub const TOKEN_EXPIRED_MESSAGE: &str = "the token is expired";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serialized error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Expired { message: String, details: Value },

    #[error("{message}")]
    Storage { message: String, details: Value },
}

impl AppError {
    /// The token lookup matched no row.
    pub fn token_not_found() -> Self {
        Self::NotFound {
            message: TOKEN_NOT_FOUND_MESSAGE.to_string(),
            details: json!({}),
        }
    }

    /// The token exists but can no longer be used.
    pub fn token_expired(details: Value) -> Self {
        Self::Expired {
            message: TOKEN_EXPIRED_MESSAGE.to_string(),
            details,
        }
    }

    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "token_not_found",
            AppError::Expired { .. } => "token_expired",
            AppError::Storage { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::UNAUTHORIZED,
            AppError::Expired { .. } => StatusCode::FORBIDDEN,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            AppError::NotFound { message, details } | AppError::Expired { message, details } => {
                (message, details)
            }
            // Driver details stay in the logs.
            AppError::Storage { .. } => ("Internal server error".to_string(), json!({})),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database error");

        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::storage(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::storage("Database error", json!({}))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        tracing::error!(error = %e, "migration error");
        AppError::storage("Migration error", json!({}))
    }
}

/// Returns `true` when the error is a unique violation on the token value.
pub fn is_unique_violation_on_token(e: &AppError) -> bool {
    matches!(
        e,
        AppError::Storage { details, .. } if details["constraint"] == "api_tokens_token_key"
    )
}
