//! Error types for the overlay services.
//!
//! The interpolation, grid and raster paths are total and never produce these.
//! Errors only come from the edges: configuration, file IO, message decoding
//! and worker channels.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Configuration Errors ===
    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    // === Input Errors ===
    #[error("Failed to read input: {0}")]
    InputError(String),

    #[error("Invalid boundary geometry: {0}")]
    InvalidBoundary(String),

    #[error("Message decoding failed: {0}")]
    DecodeError(String),

    // === Rendering Errors ===
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    // === Worker Errors ===
    #[error("Grid worker is no longer running")]
    WorkerClosed,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl OverlayError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the error originates from user-supplied input rather than the process itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OverlayError::InvalidConfig { .. }
                | OverlayError::InvalidBounds(_)
                | OverlayError::InputError(_)
                | OverlayError::InvalidBoundary(_)
                | OverlayError::DecodeError(_)
        )
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::InputError(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::DecodeError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = OverlayError::invalid_config("resolution", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'resolution': must be positive"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: OverlayError = json_err.into();
        assert!(matches!(err, OverlayError::DecodeError(_)));
        assert!(!OverlayError::WorkerClosed.is_input_error());
    }
}
