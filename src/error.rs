//! Error types for medscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Configuration errors
    #[error("Missing API key: set {variable} or fill in the config file")]
    MissingApiKey { variable: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio conversion errors
    #[error("Invalid audio frame: {message}")]
    InvalidFrame { message: String },

    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // Streaming transport errors
    #[error("Token request failed: {message}")]
    TokenRequest { message: String },

    #[error("Stream connection failed: {message}")]
    StreamConnect { message: String },

    #[error("Session is already active")]
    SessionActive,

    // Enrichment errors
    #[error("Completion request failed: {message}")]
    CompletionRequest { message: String },

    #[error("Completion response invalid: {message}")]
    CompletionResponse { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_api_key_display() {
        let error = ScribeError::MissingApiKey {
            variable: "MEDSCRIBE_STT_API_KEY".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Missing API key: set MEDSCRIBE_STT_API_KEY or fill in the config file"
        );
    }

    #[test]
    fn test_invalid_frame_display() {
        let error = ScribeError::InvalidFrame {
            message: "zero sample rate".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid audio frame: zero sample rate");
    }

    #[test]
    fn test_stream_connect_display() {
        let error = ScribeError::StreamConnect {
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Stream connection failed: connection refused"
        );
    }

    #[test]
    fn test_completion_request_display() {
        let error = ScribeError::CompletionRequest {
            message: "HTTP 500".to_string(),
        };
        assert_eq!(error.to_string(), "Completion request failed: HTTP 500");
    }

    #[test]
    fn test_session_active_display() {
        assert_eq!(
            ScribeError::SessionActive.to_string(),
            "Session is already active"
        );
    }

    #[test]
    fn test_other_display() {
        let error = ScribeError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: ScribeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: ScribeError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ScribeError>();
        assert_sync::<ScribeError>();
    }
}
