use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;

use super::form::{FieldError, ValidationError};

pub const PERMISSION_DENIED_MESSAGE: &str = "Permissão para notificações não concedida!";

/// Failure talking to the records store.
#[derive(Debug)]
pub enum PersistenceError {
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),
    Database(String),
    NotFound(i64),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "store unreachable: {}", reason),
            Self::Status { status, body } => {
                write!(f, "store responded with status {}: {}", status, body)
            }
            Self::Decode(reason) => write!(f, "unreadable store response: {}", reason),
            Self::Database(reason) => write!(f, "database error: {}", reason),
            Self::NotFound(id) => write!(f, "record {} not found", id),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> PersistenceError {
        error!("rusqlite error: {}", value);
        PersistenceError::Database(value.to_string())
    }
}

impl From<hyper::Error> for PersistenceError {
    fn from(value: hyper::Error) -> PersistenceError {
        error!("hyper error: {}", value);
        PersistenceError::Transport(value.to_string())
    }
}

impl From<hyper::http::Error> for PersistenceError {
    fn from(value: hyper::http::Error) -> PersistenceError {
        error!("request build error: {}", value);
        PersistenceError::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> PersistenceError {
        error!("serde_json error: {}", value);
        PersistenceError::Decode(value.to_string())
    }
}

/// Failure registering for or sending a push notification.
#[derive(Debug)]
pub enum NotifyError {
    PermissionDenied,
    InvalidToken,
    Transport(String),
    Relay { status: u16, body: String },
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "{}", PERMISSION_DENIED_MESSAGE),
            Self::InvalidToken => write!(f, "push token must not be empty"),
            Self::Transport(reason) => write!(f, "push relay unreachable: {}", reason),
            Self::Relay { status, body } => {
                write!(f, "push relay responded with status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for NotifyError {}

impl From<hyper::Error> for NotifyError {
    fn from(value: hyper::Error) -> NotifyError {
        NotifyError::Transport(value.to_string())
    }
}

impl From<hyper::http::Error> for NotifyError {
    fn from(value: hyper::http::Error) -> NotifyError {
        NotifyError::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(value: serde_json::Error) -> NotifyError {
        NotifyError::Transport(value.to_string())
    }
}

#[derive(Debug)]
pub enum ApiError {
    InternalError(String),
    InputFailedValidation(String),
    FormRejected { errors: ValidationError, shake: u64 },
    PathNotFound(String),
    RecordNotFound(i64),
    StoreFailed(String),
    PermissionDenied,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    reason: String,
}

#[derive(Debug, Serialize)]
struct FormRejectedResponse {
    reason: String,
    errors: Vec<FieldError>,
    shake: u64,
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> ApiError {
        match value {
            PersistenceError::NotFound(id) => ApiError::RecordNotFound(id),
            other => {
                error!("persistence error: {}", other);
                ApiError::StoreFailed(String::from("Could not reach the records store"))
            }
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(value: NotifyError) -> ApiError {
        match value {
            NotifyError::PermissionDenied => ApiError::PermissionDenied,
            NotifyError::InvalidToken => {
                ApiError::InputFailedValidation(NotifyError::InvalidToken.to_string())
            }
            other => {
                error!("notification error: {}", other);
                ApiError::InternalError(String::from("Internal Error"))
            }
        }
    }
}

fn reason(status: StatusCode, public_reason: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            reason: public_reason,
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::InternalError(public_reason) => {
                warn!(
                    "INTERNAL_SERVER_ERROR response with public_reason={}",
                    public_reason
                );
                reason(StatusCode::INTERNAL_SERVER_ERROR, public_reason)
            }
            Self::InputFailedValidation(public_reason) => {
                warn!("BAD_REQUEST response with public_reason={}", public_reason);
                reason(StatusCode::BAD_REQUEST, public_reason)
            }
            Self::FormRejected { errors, shake } => {
                let public_reason = errors.to_string();
                warn!(
                    "UNPROCESSABLE_ENTITY response with public_reason={}",
                    public_reason
                );
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(FormRejectedResponse {
                        reason: public_reason,
                        errors: errors.errors,
                        shake,
                    }),
                )
                    .into_response()
            }
            Self::PathNotFound(path) => {
                let public_reason = format!("Requested path '{}' not found", path);
                warn!("NOT_FOUND response with public_reason={}", public_reason);
                reason(StatusCode::NOT_FOUND, public_reason)
            }
            Self::RecordNotFound(id) => {
                let public_reason = format!("Record {} not found", id);
                warn!("NOT_FOUND response with public_reason={}", public_reason);
                reason(StatusCode::NOT_FOUND, public_reason)
            }
            Self::StoreFailed(public_reason) => {
                warn!("BAD_GATEWAY response with public_reason={}", public_reason);
                reason(StatusCode::BAD_GATEWAY, public_reason)
            }
            Self::PermissionDenied => {
                warn!(
                    "FORBIDDEN response with public_reason={}",
                    PERMISSION_DENIED_MESSAGE
                );
                reason(
                    StatusCode::FORBIDDEN,
                    String::from(PERMISSION_DENIED_MESSAGE),
                )
            }
        }
    }
}
