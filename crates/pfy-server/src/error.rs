//! HTTP error mapping.
//!
//! Every crate error converges here and leaves as
//! `{ success: false, message, errorMessages: [{ path, message }] }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pfy_auth::AuthError;
use pfy_db::error::DatabaseError;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
    error_messages: &'a [ErrorMessage],
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<ErrorMessage>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            errors: vec![ErrorMessage {
                path: String::new(),
                message: message.clone(),
            }],
            message,
        }
    }

    /// 400 pointing at one request field.
    pub fn invalid_field(path: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::BAD_REQUEST,
            errors: vec![ErrorMessage {
                path: path.to_string(),
                message: message.clone(),
            }],
            message,
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NoResult => Self::new(StatusCode::NOT_FOUND, "Resource not found"),
            DatabaseError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            DatabaseError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            DatabaseError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg),
            other => {
                tracing::error!(error = %other, "database error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotAuthenticated => {
                Self::new(StatusCode::UNAUTHORIZED, "You are not authorized")
            }
            AuthError::TokenExpired => Self::new(StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::InvalidToken(_) => Self::new(StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::Forbidden { .. } => Self::forbidden("Forbidden"),
            AuthError::MissingSecret | AuthError::Other(_) => {
                tracing::error!(%error, "auth misconfigured");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: &self.message,
            error_messages: &self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
