//! Error types module
//!
//! All failures surface through the `AppError` enum. Each variant knows its
//! HTTP status, machine-readable code, and log level so the API layer can
//! render and log errors uniformly.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// Record missing or not owned by the caller. The two cases are
    /// deliberately indistinguishable to the client.
    #[error("Video not found or not owned by caller")]
    NotAuthorized,

    #[error("Staging failed: {0}")]
    Staging(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Normalize failed: {0}")]
    Normalize(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Persist failed: {0}")]
    Persist(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl AppError {
    /// HTTP status code to return for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidId(_)
            | AppError::UnsupportedMediaType(_)
            | AppError::InvalidInput(_) => 400,
            AppError::Unauthorized(_) | AppError::NotAuthorized => 401,
            AppError::NotFound(_) => 404,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Staging(_)
            | AppError::Probe(_)
            | AppError::Normalize(_)
            | AppError::Publish(_)
            | AppError::Persist(_)
            | AppError::Database(_)
            | AppError::Internal(_) => 500,
        }
    }

    /// Machine-readable error code (stable across releases).
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidId(_) => "invalid_id",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::UnsupportedMediaType(_) => "unsupported_media_type",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::NotAuthorized => "not_authorized",
            AppError::Staging(_) => "staging_failed",
            AppError::Probe(_) => "probe_failed",
            AppError::Normalize(_) => "normalize_failed",
            AppError::Publish(_) => "publish_failed",
            AppError::Persist(_) => "persist_failed",
            AppError::NotFound(_) => "not_found",
            AppError::Database(_) => "database_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Log level for this error. Client mistakes log at debug, pipeline and
    /// infrastructure failures at error.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidId(_)
            | AppError::Unauthorized(_)
            | AppError::UnsupportedMediaType(_)
            | AppError::NotAuthorized
            | AppError::NotFound(_)
            | AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::PayloadTooLarge(_) => LogLevel::Warn,
            AppError::Staging(_)
            | AppError::Probe(_)
            | AppError::Normalize(_)
            | AppError::Publish(_)
            | AppError::Persist(_)
            | AppError::Database(_)
            | AppError::Internal(_) => LogLevel::Error,
        }
    }

    /// Client-facing message. Internal failures are summarized; the full
    /// cause goes to the logs only.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Staging(_) => "File save error".to_string(),
            AppError::Probe(_) => "File information error".to_string(),
            AppError::Normalize(_) => "File convert error".to_string(),
            AppError::Publish(_) => "Storage error".to_string(),
            AppError::Persist(_) | AppError::Database(_) => "Database error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
