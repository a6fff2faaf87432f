//! Domain error types for the keygate server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
///
/// `Misconfigured` and `Unauthorized` are deliberately distinct: the first is
/// a server-side configuration failure (500), the second an authentication
/// failure (401). Both carry fixed, generic bodies so a client cannot tell
/// which extraction or validation step rejected it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No API keys configured; the server refuses all gated traffic
    #[error("No API keys configured on the server")]
    Misconfigured,

    /// Credential missing where required, or present but invalid
    #[error("API key missing or invalid")]
    Unauthorized,

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Unexpected internal failure (e.g. a joined task panicked)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, body) = match self {
            AppError::Misconfigured => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
            ),
            AppError::Unauthorized => {
                (actix_web::http::StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Database(err_str) => {
                tracing::error!("database error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Internal(err_str) => {
                tracing::error!("internal error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        HttpResponse::build(status).json(ErrorBody { error: body })
    }
}

/// Error response body. Every rejection is a small JSON object with a
/// single `error` field; no internal detail leaks to the client.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}
