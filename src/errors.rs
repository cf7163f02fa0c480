/*!
 * Error types for the qamus application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions:
 * - `ProviderError`: transport-level failures of a completion service
 * - `SchemaError`: structured payloads that do not match the expected schema
 * - `LookupError`: the request-level classification surfaced to callers
 * - `AppError`: application-edge wrapper (files, config, everything else)
 */

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response envelope fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Generation stopped at the output token ceiling
    #[error("Output token limit reached (max_tokens: {max_tokens:?})")]
    TokenLimitExceeded {
        /// The ceiling that was requested, if any
        max_tokens: Option<u32>,
    },

    /// The provider answered without any content
    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify a non-success HTTP status returned by a provider
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            429 => Self::RateLimitExceeded(message),
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while validating a structured completion payload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The raw text is not JSON at all
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    /// The payload is JSON but not an object
    #[error("Response is not a JSON object")]
    NotAnObject,

    /// A required field is absent, null or blank
    #[error("Response is missing required field '{0}'")]
    MissingField(String),

    /// The service filled in the explicit `error` field
    #[error("Service reported an error: {0}")]
    ServiceReported(String),

    /// Fields are present but have the wrong types
    #[error("Response does not match the expected shape: {0}")]
    InvalidShape(String),
}

/// Coarse classification of a failed lookup, stable across transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    SchemaError,
    ServiceUnavailable,
    RateLimited,
    UnexpectedServiceError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::SchemaError => "schema_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::RateLimited => "rate_limited",
            Self::UnexpectedServiceError => "unexpected_service_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-level lookup failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Input rejected before or by the service
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Structured payload could not be validated
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Completion service could not be reached in time
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Quota or rate limit signalled by the service
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success answer from the service
    #[error("Unexpected service error: {0}")]
    UnexpectedService(String),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Schema(_) => ErrorKind::SchemaError,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::UnexpectedService(_) => ErrorKind::UnexpectedServiceError,
        }
    }

    /// HTTP status used when the error reaches an HTTP caller
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::RateLimited => 429,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::SchemaError | ErrorKind::UnexpectedServiceError => 500,
        }
    }
}

impl From<ProviderError> for LookupError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::ConnectionError(message) => Self::ServiceUnavailable(message),
            ProviderError::RateLimitExceeded(message) => Self::RateLimited(message),
            ProviderError::ApiError { status_code: 429, message } => Self::RateLimited(message),
            other => Self::UnexpectedService(other.to_string()),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a lookup
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// HTTP status used when the error reaches an HTTP caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Lookup(e) => e.status_code(),
            Self::Provider(e) => LookupError::from(e.clone()).status_code(),
            _ => 500,
        }
    }

    /// Wire name of the error class
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Lookup(e) => e.kind().as_str(),
            Self::Provider(e) => LookupError::from(e.clone()).kind().as_str(),
            Self::File(_) => "file_error",
            Self::Unknown(_) => "unknown_error",
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
