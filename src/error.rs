//! Error types for Quadrangle server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::scheduling::SchedulingError;

/// Application error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StoreFailure = 3,
    NoSuchUser = 4,
    NoSuchResource = 5,
    NoSuchBooking = 6,
    SlotConflict = 7,
    Duplicate = 8,
    BadValue = 9,
    RecurrenceTooLong = 10,
    ResourceNotBookable = 11,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document store error: {0}")]
    Store(#[from] reqwest::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchResource, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Store(e) => {
                tracing::error!("Document store error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorCode::StoreFailure,
                    "Document store error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ResourceNotBookable, msg.clone())
            }
            AppError::Scheduling(e) => scheduling_response(e),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// HTTP mapping of the scheduling taxonomy. Integrity-class errors
/// (duplicates, illegal transitions) are logged and surfaced generically.
fn scheduling_response(error: &SchedulingError) -> (StatusCode, ErrorCode, String) {
    match error {
        SchedulingError::InvalidRequest(_) => {
            (StatusCode::BAD_REQUEST, ErrorCode::BadValue, error.to_string())
        }
        SchedulingError::RecurrenceTooLong => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::RecurrenceTooLong,
            error.to_string(),
        ),
        SchedulingError::ResourceUnavailable { .. } | SchedulingError::AlreadyBooked { .. } => {
            (StatusCode::CONFLICT, ErrorCode::SlotConflict, error.to_string())
        }
        SchedulingError::UnknownOccurrence(_) => (
            StatusCode::NOT_FOUND,
            ErrorCode::NoSuchBooking,
            error.to_string(),
        ),
        SchedulingError::NotPermitted { .. } => (
            StatusCode::FORBIDDEN,
            ErrorCode::NotAuthorized,
            error.to_string(),
        ),
        SchedulingError::DuplicateOccurrence(_) | SchedulingError::InvalidTransition { .. } => {
            tracing::error!("Scheduling integrity error: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Failure,
                "Internal integrity error".to_string(),
            )
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
