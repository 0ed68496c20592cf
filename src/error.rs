//! # Error Handling
//!
//! Crate-wide error type and its mapping to HTTP responses. Every handler
//! returns `AppResult<T>`; failures are converted at the actix boundary into
//! the JSON error shape the front-end expects:
//!
//! ```json
//! {"status": "error", "message": "No file part"}
//! ```
//!
//! ## Status code mapping:
//! - `BadRequest` → 400 (missing fields, empty filenames, bad extensions)
//! - `NotFound` → 404 (requested file absent from the storage folder)
//! - `PayloadTooLarge` → 413 (upload over the configured cap)
//! - `Internal` / `ConfigError` → 500 (I/O, parse, transcoding failures)

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Client sent invalid or incomplete data
    BadRequest(String),

    /// Requested file was not found in the storage folder
    NotFound(String),

    /// Upload body exceeded the configured size limit
    PayloadTooLarge(String),

    /// Server-side failures (file I/O, index parsing, transcoding)
    Internal(String),

    /// Configuration file or environment variable problems
    ConfigError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (actix_web::http::StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (actix_web::http::StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => {
                (actix_web::http::StatusCode::PAYLOAD_TOO_LARGE, msg)
            }
            AppError::Internal(msg) => {
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::ConfigError(msg) => {
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let mut body = json!({
            "status": "error",
            "message": message,
        });

        // The legacy file-metadata client keys off an "error" field on 404s.
        if matches!(self, AppError::NotFound(_)) {
            body["error"] = json!(message);
        }

        HttpResponse::build(status).json(body)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
