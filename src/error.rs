//! Error types and handling for Kairos
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Kairos operations
pub type Result<T> = std::result::Result<T, KairosError>;

/// Main error type for Kairos
#[derive(Debug, Error)]
pub enum KairosError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Vehicle API transport errors (network unreachable, bad gateway, ...)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Authentication/authorization errors (fatal during bootstrap)
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Telemetry reported a value outside configured bounds
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// A control call was acknowledged as failed by the vehicle
    #[error("Actuator rejected: {message}")]
    Actuator { message: String },

    /// API integration errors (unexpected payloads, missing fields)
    #[error("API error: {message}")]
    Api { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl KairosError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        KairosError::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        KairosError::Transport {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        KairosError::Auth {
            message: message.into(),
        }
    }

    /// Create a new invalid-state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        KairosError::InvalidState {
            message: message.into(),
        }
    }

    /// Create a new actuator rejection error
    pub fn actuator<S: Into<String>>(message: S) -> Self {
        KairosError::Actuator {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        KairosError::Api {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        KairosError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        KairosError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        KairosError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for KairosError {
    fn from(err: std::io::Error) -> Self {
        KairosError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for KairosError {
    fn from(err: serde_yaml::Error) -> Self {
        KairosError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KairosError {
    fn from(err: serde_json::Error) -> Self {
        KairosError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for KairosError {
    fn from(err: chrono::ParseError) -> Self {
        KairosError::validation("datetime", err.to_string())
    }
}

#[cfg(feature = "api")]
impl From<reqwest::Error> for KairosError {
    fn from(err: reqwest::Error) -> Self {
        KairosError::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = KairosError::config("test config error");
        assert!(matches!(err, KairosError::Config { .. }));

        let err = KairosError::transport("test transport error");
        assert!(matches!(err, KairosError::Transport { .. }));

        let err = KairosError::validation("field", "test validation error");
        assert!(matches!(err, KairosError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = KairosError::config("test error");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Configuration error: test error");

        let err = KairosError::validation("test_field", "invalid value");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Validation error: test_field - invalid value");
    }
}
