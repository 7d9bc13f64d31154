// src/error.rs
use std::path::PathBuf;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Startup failures. Any of these stops the process before it binds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("persona file {path} could not be read: {source}")]
    PersonaUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persona file {0} is empty")]
    PersonaEmpty(PathBuf),
}

/// Failures of the outbound completion call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("provider rejected credentials")]
    Unauthorized,

    #[error("provider rate limit reached")]
    RateLimited,

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::Timeout | UpstreamError::RateLimited => true,
            UpstreamError::Status(code) => *code >= 500,
            UpstreamError::Unauthorized | UpstreamError::Malformed(_) => false,
        }
    }
}

/// Per-request errors, translated to HTTP at the handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidBody(rejection) => {
                (rejection.status(), "INVALID_BODY", rejection.body_text())
            }
            AppError::Upstream(UpstreamError::RateLimited | UpstreamError::Timeout) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_UNAVAILABLE",
                "The language model service is temporarily unavailable".to_string(),
            ),
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "The language model service is unavailable".to_string(),
            ),
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}
