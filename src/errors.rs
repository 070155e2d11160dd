//! Error types for telemetry setup

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EotelError>;

/// Errors raised while building the telemetry pipeline.
///
/// Delivery failures never show up here; sinks log them and move on.
#[derive(Debug, Error)]
pub enum EotelError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sentry DSN could not be parsed
    #[error("Invalid Sentry DSN: {0}")]
    InvalidDsn(String),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Sink answered with a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
