//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tokio_postgres::error::SqlState;
use tracing::error;

use crate::response::{field_errors, ApiResponse};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidFields(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Replace the message of a conflict error, leaving other errors untouched.
    ///
    /// The generic storage layer reports uniqueness violations with a neutral
    /// message; routers use this to attach the domain-specific one.
    pub fn conflict_message(self, message: impl Into<String>) -> Self {
        match self {
            AppError::Conflict(_) => AppError::Conflict(message.into()),
            other => other,
        }
    }
}

/// Map a raw driver error to an application error.
///
/// Integrity violations surface as client errors; the raw driver message for
/// a constraint violation never reaches the caller.
pub fn map_db_error(err: tokio_postgres::Error) -> AppError {
    if let Some(db_err) = err.as_db_error() {
        if *db_err.code() == SqlState::UNIQUE_VIOLATION {
            return AppError::Conflict(
                "A record with the same unique value already exists.".to_string(),
            );
        }
        if *db_err.code() == SqlState::FOREIGN_KEY_VIOLATION {
            return AppError::BadRequest("Referenced record does not exist.".to_string());
        }
    }
    AppError::Database(err)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details, errors) = match self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    Some(e.to_string()),
                    None,
                )
            }
            AppError::Pool(e) => {
                error!("Pool error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection pool exhausted".to_string(),
                    Some(e.to_string()),
                    None,
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            AppError::InvalidFields(e) => (
                StatusCode::BAD_REQUEST,
                "Validation failed.".to_string(),
                None,
                Some(field_errors(&e)),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None, None),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    Some(msg),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::error_detailed(message, details, errors));

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;
