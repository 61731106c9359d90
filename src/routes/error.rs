use actix_web::http::{header, StatusCode};
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::core::{ShortlistError, TransitionError};
use crate::models::ErrorResponse;
use crate::services::{AuthError, CaptchaError, PostgresError};

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("Too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Captcha(#[from] CaptchaError),

    #[error(transparent)]
    Shortlist(#[from] ShortlistError),

    #[error("Database error: {0}")]
    Database(PostgresError),
}

impl From<PostgresError> for ApiError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::InvalidQuery(_) => "invalid_query",
            ApiError::InvalidPath(_) => "invalid_path",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::InvalidTransition(_) => "invalid_transition",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Captcha(CaptchaError::MissingToken | CaptchaError::Rejected(_)) => "captcha_failed",
            ApiError::Captcha(_) => "captcha_unavailable",
            ApiError::Shortlist(_) => "shortlist_full",
            ApiError::Database(_) => "internal_error",
        }
    }

    /// Message safe to show a client
    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => "Authentication required".to_string(),
            ApiError::Captcha(CaptchaError::MissingToken | CaptchaError::Rejected(_)) => {
                "Captcha verification failed".to_string()
            }
            ApiError::Captcha(_) => "Captcha verification is unavailable, try again shortly".to_string(),
            ApiError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidJson(_)
            | ApiError::InvalidQuery(_)
            | ApiError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Shortlist(_) => StatusCode::CONFLICT,
            ApiError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Captcha(CaptchaError::MissingToken | CaptchaError::Rejected(_)) => StatusCode::BAD_REQUEST,
            ApiError::Captcha(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            ApiError::Database(e) => tracing::error!("Database error: {}", e),
            ApiError::Captcha(e) if status.is_server_error() => tracing::error!("Captcha service error: {}", e),
            ApiError::Unauthorized(e) => tracing::info!("Unauthorized request: {}", e),
            _ => {}
        }

        let mut builder = HttpResponse::build(status);
        if let ApiError::RateLimited { retry_after_secs } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }

        builder.json(ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::InvalidJson(err.to_string()).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidQuery(err.to_string()).into()
}

/// Handle path extraction errors (e.g. malformed ids)
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidPath(err.to_string()).into()
}
