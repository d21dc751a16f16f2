//! Error types for voice-platform.

use console_core::ConsoleError;
use thiserror::Error;

/// Errors that can occur when talking to the voice-agent platform.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the platform.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<VoiceError> for ConsoleError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Http(e) => ConsoleError::Network(e.to_string()),
            VoiceError::Json(e) => ConsoleError::MalformedResponse(e.to_string()),
            VoiceError::Api { status, message } => ConsoleError::Upstream { status, message },
            VoiceError::Config(msg) => ConsoleError::Configuration(msg),
        }
    }
}
