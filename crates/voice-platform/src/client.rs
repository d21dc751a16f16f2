//! Voice-agent platform HTTP client.

use std::time::Duration;

use console_core::{
    async_trait, AgentConfig, AgentSpec, CallRecord, ConsoleError, LlmUpdate, VoiceAgent,
    VoicePlatform, WebCall,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::VoicePlatformConfig;
use crate::error::VoiceError;
use crate::types::{is_empty_payload, ApiErrorBody, CreateWebCallRequest};

/// Client for the voice-agent platform's REST API.
#[derive(Clone)]
pub struct VoiceClient {
    http: Client,
    config: VoicePlatformConfig,
}

impl VoiceClient {
    /// Create a client with the given configuration.
    pub fn new(config: VoicePlatformConfig) -> Result<Self, VoiceError> {
        if config.api_key.trim().is_empty() {
            return Err(VoiceError::Config("API key is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(VoiceError::Http)?;

        info!("Voice platform client ready for {}", config.base_url);
        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, VoiceError> {
        Self::new(VoicePlatformConfig::from_env()?)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &VoicePlatformConfig {
        &self.config
    }

    /// Register a web call for an agent.
    pub async fn register_web_call(&self, agent_id: &str) -> Result<WebCall, VoiceError> {
        let request = self
            .http
            .post(self.config.create_web_call_url())
            .json(&CreateWebCallRequest { agent_id });
        let call: WebCall = self.send_json(request).await?;
        info!(call_id = %call.call_id, agent_id, "Registered web call");
        Ok(call)
    }

    /// Retrieve a call. Returns `None` while the platform has no data for it.
    pub async fn fetch_call(&self, call_id: &str) -> Result<Option<CallRecord>, VoiceError> {
        let response = self.authorized(self.http.get(self.config.get_call_url(call_id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(call_id, "Call not available yet");
            return Ok(None);
        }

        let response = check_status(response).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let mut value: Value = serde_json::from_str(&body)?;
        if is_empty_payload(&value) {
            return Ok(None);
        }
        if let Value::Object(map) = &mut value {
            map.entry("call_id")
                .or_insert_with(|| Value::String(call_id.to_string()));
        }

        Ok(Some(serde_json::from_value(value)?))
    }

    /// Push an LLM configuration update.
    pub async fn patch_llm(&self, llm_id: &str, update: &LlmUpdate) -> Result<AgentConfig, VoiceError> {
        let request = self.http.patch(self.config.update_llm_url(llm_id)).json(update);
        let config: AgentConfig = self.send_json(request).await?;
        info!(llm_id, model = %update.model, "Updated LLM configuration");
        Ok(config)
    }

    /// Create a new LLM configuration.
    pub async fn post_llm(&self, update: &LlmUpdate) -> Result<AgentConfig, VoiceError> {
        let request = self.http.post(self.config.create_llm_url()).json(update);
        let config: AgentConfig = self.send_json(request).await?;
        info!(llm_id = %config.llm_id, "Created LLM configuration");
        Ok(config)
    }

    /// Create a voice agent.
    pub async fn post_agent(&self, spec: &AgentSpec) -> Result<VoiceAgent, VoiceError> {
        let request = self.http.post(self.config.create_agent_url()).json(spec);
        let agent: VoiceAgent = self.send_json(request).await?;
        info!(agent_id = %agent.agent_id, name = %spec.agent_name, "Created voice agent");
        Ok(agent)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, VoiceError> {
        let response = self.authorized(request).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        debug!("Voice platform response: {}", body);
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(response: Response) -> Result<Response, VoiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&error_text)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or(error_text);

    Err(VoiceError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl VoicePlatform for VoiceClient {
    async fn create_web_call(&self, agent_id: &str) -> Result<WebCall, ConsoleError> {
        Ok(self.register_web_call(agent_id).await?)
    }

    async fn get_call(&self, call_id: &str) -> Result<Option<CallRecord>, ConsoleError> {
        Ok(self.fetch_call(call_id).await?)
    }

    async fn update_llm(&self, llm_id: &str, update: &LlmUpdate) -> Result<AgentConfig, ConsoleError> {
        self.patch_llm(llm_id, update).await.map_err(|e| match e {
            VoiceError::Api { status, message } => ConsoleError::UpstreamConfig { status, message },
            other => other.into(),
        })
    }

    async fn create_llm(&self, update: &LlmUpdate) -> Result<AgentConfig, ConsoleError> {
        Ok(self.post_llm(update).await?)
    }

    async fn create_agent(&self, spec: &AgentSpec) -> Result<VoiceAgent, ConsoleError> {
        Ok(self.post_agent(spec).await?)
    }
}
