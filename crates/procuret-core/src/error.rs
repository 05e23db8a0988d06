//! Error types for Procuret operations.
//!
//! Every failure surfaced by the SDK's formatting and coding layer is a variant of
//! [`Error`], each carrying a stable code for programmatic handling.

use thiserror::Error;

/// Main error type for Procuret operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A query parameter value has no text representation
    #[error("Invalid query parameter value: {0}")]
    InvalidValue(String),

    /// A query parameter key is unusable
    #[error("Invalid query parameter key: {0}")]
    InvalidKey(String),

    /// A record could not be decoded from its transport representation
    #[error("Failed to decode record: {0}")]
    DecodeError(String),

    /// A record could not be encoded into its transport representation
    #[error("Failed to encode record: {0}")]
    EncodeError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Procuret operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue(_) => "INVALID_VALUE",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::EncodeError(_) => "ENCODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true if the caller supplied the offending input.
    ///
    /// Caller errors are fixed by changing the input; the rest point at a
    /// misconfigured client or a malformed server payload.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidValue(_) | Self::InvalidKey(_) | Self::ValidationError(_)
        )
    }
}

// Conversions from external error types
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

// Raised while classifying query parameter values.
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::InvalidValue(format!("value failed to serialize: {msg}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
