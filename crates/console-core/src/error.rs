//! Error types shared across the console.

use thiserror::Error;

use crate::mode::Mode;

/// Errors that can occur while configuring agents, editing prompts or
/// running calls.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A profile or stored record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The voice platform rejected an LLM configuration push.
    #[error("voice platform rejected configuration ({status}): {message}")]
    UpstreamConfig { status: u16, message: String },

    /// Any other non-success response from the voice platform.
    #[error("voice platform error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The completion endpoint returned unparsable or schema-violating JSON.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    /// Post-call analytics never became available.
    #[error("analytics unavailable for call {call_id} after {attempts} attempts")]
    AnalyticsUnavailable { call_id: String, attempts: u32 },

    /// A placeholder referenced a profile field that has no value.
    #[error("missing value for `{field}` in {mode} mode")]
    MissingField { field: &'static str, mode: Mode },

    /// The mode has no LLM config or voice agent on the platform yet.
    #[error("{mode} mode has no {what} provisioned")]
    NotProvisioned { mode: Mode, what: &'static str },

    /// The mode already has a voice agent.
    #[error("{0} mode is already provisioned")]
    AlreadyProvisioned(Mode),

    /// A call is already running for this user.
    #[error("a call is already active: {call_id}")]
    SessionActive { call_id: String },

    /// No call is running for this user.
    #[error("no active call session")]
    NoActiveSession,

    /// User input failed validation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An edited prompt lost a placeholder that the current prompt has.
    #[error("edited prompt drops placeholder {0}")]
    PlaceholderDropped(String),

    /// The completion endpoint failed.
    #[error("completion failed: {0}")]
    Completion(String),

    /// Transport-level failure talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// The document store failed.
    #[error("store error: {0}")]
    Store(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl ConsoleError {
    /// Shorthand for a missing user profile.
    pub fn profile_not_found(user_id: impl Into<String>) -> Self {
        ConsoleError::NotFound {
            entity: "profile",
            id: user_id.into(),
        }
    }
}
