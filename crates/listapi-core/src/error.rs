//! Error types for the list API
//!
//! Three layers of failure live here:
//! - [`Error`]: infrastructure failures (configuration, I/O, store bootstrap)
//! - [`StoreError`]: a failure reported by the collaborator store
//! - [`ApiError`]: the request-level outcome rendered into an HTTP error body

use serde_json::{Value, json};
use thiserror::Error;

use crate::request::{ApiResponse, Method};

/// Result type alias for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core infrastructure error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store bootstrap or persistence errors
    #[error("Store error: {0}")]
    Store(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Failure reported by the collaborator store
///
/// The message is the store's own diagnostic (the `sql_msg` of an error body)
/// and may be absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or("unspecified store failure"))]
pub struct StoreError {
    /// Diagnostic message from the store, if it produced one
    pub message: Option<String>,
}

impl StoreError {
    /// Create a store error carrying a diagnostic message
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: Some(msg.into()),
        }
    }

    /// Create a store error without a diagnostic message
    pub fn unspecified() -> Self {
        Self { message: None }
    }

    /// The diagnostic message, if any
    pub fn sql_msg(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Request-level error
///
/// Every variant maps onto an HTTP status and an error `key`. Store failures
/// are always reported as client errors (400).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Caller is not authenticated or not authorized
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed request (body, missing field, immutable list)
    #[error("{message}")]
    BadRequest {
        /// Human-readable message
        message: String,
    },

    /// The store rejected the operation
    #[error("{message}")]
    Database {
        /// Human-readable message
        message: String,
        /// Diagnostic object: always carries `argument` and `sql_msg`
        data: Value,
    },

    /// No route for this method/path combination
    #[error("No route for {method} {path}")]
    NoRoute {
        /// Request method
        method: Method,
        /// Request path
        path: String,
    },
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest {
            message: msg.into(),
        }
    }

    /// Create a database error with the standard `{argument, sql_msg}` data
    pub fn database(msg: impl Into<String>, argument: Option<&str>, err: &StoreError) -> Self {
        Self::Database {
            message: msg.into(),
            data: json!({
                "argument": argument,
                "sql_msg": err.sql_msg(),
            }),
        }
    }

    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::BadRequest { .. } | Self::Database { .. } => 400,
            Self::NoRoute { .. } => 404,
        }
    }

    /// Machine-readable error key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::BadRequest { .. } => "bad_request",
            Self::Database { .. } => "database_error",
            Self::NoRoute { .. } => "not_found",
        }
    }

    /// Diagnostic data attached to the error, or null
    pub fn data(&self) -> Value {
        match self {
            Self::Database { data, .. } => data.clone(),
            _ => Value::Null,
        }
    }

    /// Render the error envelope
    pub fn to_response(&self) -> ApiResponse {
        let message = match self {
            Self::NoRoute { .. } => "Not found".to_string(),
            other => other.to_string(),
        };

        ApiResponse::json(
            self.status(),
            json!({
                "error": {
                    "code": self.status(),
                    "key": self.key(),
                    "message": message,
                    "data": self.data(),
                }
            }),
        )
    }
}
