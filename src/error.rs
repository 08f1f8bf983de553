//! Error types for the OFLP data layer

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for OFLP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Uniform error record for everything that can go wrong between a consumer
/// and the backend, regardless of origin.
///
/// Cloneable on purpose: a terminal error is fanned out to every caller
/// attached to the same in-flight request.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response received (connection failure, timeout).
    #[error("Network error: {message}")]
    Network {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The server responded with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<serde_json::Value>,
        timestamp: DateTime<Utc>,
    },

    /// The request could not be constructed or dispatched.
    #[error("Request error: {message}")]
    Request {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
            code: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        ApiError::Request {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// A resource-not-found error, used by providers for unknown ids.
    pub fn not_found(resource: impl std::fmt::Display) -> Self {
        Self::http(404, format!("Resource not found: {}", resource))
    }

    /// HTTP status code, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// When the error was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ApiError::Network { timestamp, .. }
            | ApiError::Http { timestamp, .. }
            | ApiError::Request { timestamp, .. } => *timestamp,
        }
    }

    /// 4xx responses are terminal: the request will not succeed on retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::network("Request timed out")
        } else if err.is_connect() {
            ApiError::network("Failed to connect to API")
        } else if err.is_builder() || err.is_request() {
            ApiError::request(err.to_string())
        } else {
            ApiError::network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}
