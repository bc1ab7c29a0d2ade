/// Error types for the SNS service
///
/// Handlers return [`Result`] and the error renders itself as
/// `{"error": "<message>"}` with the matching status code. Internal failures
/// keep their cause for the log and show only the canonical message.
use crate::messages::MessageKey;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{error::ResponseError, http::StatusCode, HttpRequest, HttpResponse};
use std::fmt;

/// Result type for sns-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Validation failed or the request was malformed
    BadRequest(MessageKey),

    /// No caller identity, or the token was rejected
    Unauthorized(MessageKey),

    /// Caller does not own the resource
    Forbidden(MessageKey),

    /// Resource not found
    NotFound(MessageKey),

    /// Relation already exists
    Conflict(MessageKey),

    /// Database, storage or other internal failure
    Internal { message: MessageKey, detail: String },
}

impl AppError {
    pub fn internal(message: MessageKey, detail: impl fmt::Display) -> Self {
        AppError::Internal {
            message,
            detail: detail.to_string(),
        }
    }

    pub fn message(&self) -> MessageKey {
        match self {
            AppError::BadRequest(key)
            | AppError::Unauthorized(key)
            | AppError::Forbidden(key)
            | AppError::NotFound(key)
            | AppError::Conflict(key) => *key,
            AppError::Internal { message, .. } => *message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal { message, detail } => write!(f, "{}: {}", message, detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal { message, detail } = self {
            tracing::error!(error = %detail, "{}", message);
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.message().text(),
        }))
    }
}

/// Extractor error handlers so malformed input gets the same body shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "rejected JSON body");
    AppError::BadRequest(MessageKey::InvalidJson).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "rejected query string");
    AppError::BadRequest(MessageKey::InvalidQuery).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "rejected path parameter");
    AppError::BadRequest(MessageKey::InvalidPath).into()
}
