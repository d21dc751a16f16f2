//! Recording voice platform.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use console_core::{
    async_trait, AgentConfig, AgentSpec, CallRecord, ConsoleError, LlmUpdate, VoiceAgent,
    VoicePlatform, WebCall,
};

use crate::completion::lock;

/// How `get_call` answers for one call id.
#[derive(Debug, Clone)]
struct CallScript {
    empty_attempts: u32,
    record: Option<CallRecord>,
}

/// A voice platform that records every request and answers from memory.
///
/// `update_llm` echoes the pushed fields back as the applied
/// configuration. `get_call` returns nothing until a record is scripted
/// with [`ready_after`](Self::ready_after).
#[derive(Default)]
pub struct MockVoicePlatform {
    updates: Mutex<Vec<(String, LlmUpdate)>>,
    created_llms: Mutex<Vec<LlmUpdate>>,
    created_agents: Mutex<Vec<AgentSpec>>,
    web_calls: Mutex<Vec<String>>,
    call_scripts: Mutex<HashMap<String, CallScript>>,
    get_call_attempts: Mutex<HashMap<String, u32>>,
    update_failure: Mutex<Option<(u16, String)>>,
    next_id: AtomicU64,
}

impl MockVoicePlatform {
    /// Create an empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_call` answer empty `attempts` times, then with `record`.
    pub fn ready_after(&self, call_id: &str, attempts: u32, record: CallRecord) {
        lock(&self.call_scripts).insert(
            call_id.to_string(),
            CallScript {
                empty_attempts: attempts,
                record: Some(record),
            },
        );
    }

    /// Make every `update_llm` fail with the given status.
    pub fn fail_updates(&self, status: u16, message: impl Into<String>) {
        *lock(&self.update_failure) = Some((status, message.into()));
    }

    /// Let `update_llm` succeed again.
    pub fn clear_failures(&self) {
        *lock(&self.update_failure) = None;
    }

    /// `(llm_id, update)` pairs pushed so far.
    pub fn updates(&self) -> Vec<(String, LlmUpdate)> {
        lock(&self.updates).clone()
    }

    /// LLM configs created so far.
    pub fn created_llms(&self) -> Vec<LlmUpdate> {
        lock(&self.created_llms).clone()
    }

    /// Agents created so far.
    pub fn created_agents(&self) -> Vec<AgentSpec> {
        lock(&self.created_agents).clone()
    }

    /// Agent ids web calls were registered for.
    pub fn web_calls(&self) -> Vec<String> {
        lock(&self.web_calls).clone()
    }

    /// How many times `get_call` was asked about a call.
    pub fn get_call_attempts(&self, call_id: &str) -> u32 {
        lock(&self.get_call_attempts)
            .get(call_id)
            .copied()
            .unwrap_or(0)
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl VoicePlatform for MockVoicePlatform {
    async fn create_web_call(&self, agent_id: &str) -> Result<WebCall, ConsoleError> {
        lock(&self.web_calls).push(agent_id.to_string());
        let call_id = self.next_id("call");
        Ok(WebCall {
            access_token: format!("token_{}", call_id),
            call_id,
        })
    }

    async fn get_call(&self, call_id: &str) -> Result<Option<CallRecord>, ConsoleError> {
        let attempt = {
            let mut attempts = lock(&self.get_call_attempts);
            let count = attempts.entry(call_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let scripts = lock(&self.call_scripts);
        Ok(scripts
            .get(call_id)
            .filter(|script| attempt > script.empty_attempts)
            .and_then(|script| script.record.clone()))
    }

    async fn update_llm(&self, llm_id: &str, update: &LlmUpdate) -> Result<AgentConfig, ConsoleError> {
        if let Some((status, message)) = lock(&self.update_failure).clone() {
            return Err(ConsoleError::UpstreamConfig { status, message });
        }

        lock(&self.updates).push((llm_id.to_string(), update.clone()));
        Ok(AgentConfig {
            llm_id: llm_id.to_string(),
            llm_websocket_url: Some(format!("wss://mock.voice/llm/{}", llm_id)),
            model: Some(update.model.clone()),
            general_prompt: Some(update.general_prompt.clone()),
            begin_message: Some(update.begin_message.clone()),
            ..Default::default()
        })
    }

    async fn create_llm(&self, update: &LlmUpdate) -> Result<AgentConfig, ConsoleError> {
        lock(&self.created_llms).push(update.clone());
        let llm_id = self.next_id("llm");
        Ok(AgentConfig {
            llm_websocket_url: Some(format!("wss://mock.voice/llm/{}", llm_id)),
            model: Some(update.model.clone()),
            general_prompt: Some(update.general_prompt.clone()),
            begin_message: Some(update.begin_message.clone()),
            llm_id,
            ..Default::default()
        })
    }

    async fn create_agent(&self, spec: &AgentSpec) -> Result<VoiceAgent, ConsoleError> {
        lock(&self.created_agents).push(spec.clone());
        Ok(VoiceAgent {
            agent_id: self.next_id("agent"),
            agent_name: Some(spec.agent_name.clone()),
            voice_id: Some(spec.voice_id.clone()),
            llm_websocket_url: Some(spec.llm_websocket_url.clone()),
            ..Default::default()
        })
    }
}
