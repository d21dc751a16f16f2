//! Voice-agent platform records and the traits that reach the platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConsoleError;

/// The platform's resolved LLM configuration for one mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub llm_id: String,
    #[serde(default)]
    pub llm_websocket_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub general_prompt: Option<String>,
    #[serde(default)]
    pub begin_message: Option<String>,
    /// Fields the platform returned that this crate does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A provisioned voice agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceAgent {
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub llm_websocket_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Post-call analysis produced by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysis {
    #[serde(default)]
    pub user_sentiment: Option<String>,
    #[serde(default)]
    pub call_summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A completed call as retrieved from the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    #[serde(default)]
    pub end_timestamp: Option<i64>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub call_analysis: Option<CallAnalysis>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub call_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CallRecord {
    /// Sentiment label, if the analysis has one.
    pub fn sentiment(&self) -> Option<&str> {
        self.call_analysis
            .as_ref()
            .and_then(|a| a.user_sentiment.as_deref())
    }

    /// Summary text, if the analysis has one.
    pub fn summary(&self) -> Option<&str> {
        self.call_analysis
            .as_ref()
            .and_then(|a| a.call_summary.as_deref())
    }

    /// Call length, from the explicit duration or the timestamps.
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.duration_ms.or(match (self.start_timestamp, self.end_timestamp) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        })
    }
}

/// The fields pushed when re-applying a mode's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUpdate {
    pub model: String,
    pub general_prompt: String,
    pub begin_message: String,
}

/// Parameters for creating a voice agent on top of an LLM config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub llm_websocket_url: String,
    pub agent_name: String,
    pub voice_id: String,
    pub language: String,
}

/// A freshly registered web call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebCall {
    pub call_id: String,
    pub access_token: String,
}

/// Lifecycle events relayed from the media session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started,
    Ended {
        #[serde(default)]
        code: Option<i64>,
        #[serde(default)]
        reason: Option<String>,
    },
    Error {
        message: String,
    },
    TranscriptUpdate {
        speaker: String,
        text: String,
    },
}

/// State of a user's call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    NotStarted,
    Active,
    Inactive,
}

/// The voice-agent platform's HTTP surface.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    /// Register a web call for an agent.
    async fn create_web_call(&self, agent_id: &str) -> Result<WebCall, ConsoleError>;

    /// Retrieve a call. `None` means the platform has nothing for it yet.
    async fn get_call(&self, call_id: &str) -> Result<Option<CallRecord>, ConsoleError>;

    /// Re-apply an LLM configuration. Non-success responses map to
    /// [`ConsoleError::UpstreamConfig`].
    async fn update_llm(&self, llm_id: &str, update: &LlmUpdate)
        -> Result<AgentConfig, ConsoleError>;

    /// Create a new LLM configuration.
    async fn create_llm(&self, update: &LlmUpdate) -> Result<AgentConfig, ConsoleError>;

    /// Create a voice agent.
    async fn create_agent(&self, spec: &AgentSpec) -> Result<VoiceAgent, ConsoleError>;
}

/// The real-time media session carrying a call.
#[async_trait]
pub trait CallTransport: Send + Sync {
    /// Open the media session for a registered call.
    async fn start(&self, call: &WebCall) -> Result<(), ConsoleError>;

    /// Close the media session.
    async fn stop(&self, call_id: &str) -> Result<(), ConsoleError>;

    /// Get a human-readable name for this transport.
    fn name(&self) -> &str;
}
