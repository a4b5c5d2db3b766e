//! Error handling module
//!
//! Defines error types and handling logic used in the project

use reqwest::StatusCode;
use thiserror::Error;

/// Status codes the service may return while temporarily overloaded or failing
pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response body parsed but does not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Service answered with a non-success status
    #[error("Service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Transient failures persisted through every retry
    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// HTTP status behind this error, if any
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::HttpClient(e) => e.status(),
            ClientError::RetriesExhausted { last, .. } => last.status_code(),
            _ => None,
        }
    }

    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Status { status, .. } => is_transient_status(*status),
            ClientError::HttpClient(e) => e.is_connect(),
            _ => false,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ClientError::Config(_) => "config_error",
            ClientError::HttpClient(_) => "transport_error",
            ClientError::Serialization(_) => "serialization_error",
            ClientError::InvalidResponse(_) => "invalid_response_error",
            ClientError::Validation(_) => "invalid_request_error",
            ClientError::Status { .. } => "api_error",
            ClientError::RetriesExhausted { .. } => "retries_exhausted_error",
        }
    }
}

/// Whether a status code belongs to the retried set
pub fn is_transient_status(status: StatusCode) -> bool {
    TRANSIENT_STATUS_CODES.contains(&status.as_u16())
}

/// Result type alias
pub type ClientResult<T> = Result<T, ClientError>;
