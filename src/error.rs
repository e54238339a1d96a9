//! Error types shared by the protocol, session and UI layers

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a TinyAPRS device
#[derive(Error, Debug)]
pub enum ConfigToolError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not connected to a device")]
    NotConnected,

    #[error("No response from device within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Device rejected '{command}': {reason}")]
    Rejected { command: String, reason: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl ConfigToolError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse(reason.into())
    }
}

/// Result type alias for configuration tool operations
pub type ToolResult<T> = Result<T, ConfigToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_reports_milliseconds() {
        let err = ConfigToolError::Timeout(Duration::from_millis(5000));
        assert_eq!(err.to_string(), "No response from device within 5000 ms");
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = ConfigToolError::validation("callsign", "too long");
        assert_eq!(err.to_string(), "Invalid callsign: too long");
    }
}
