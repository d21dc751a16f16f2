//! Configuration for the voice-agent platform client.

use std::env;

use crate::error::VoiceError;

/// Configuration for connecting to the voice-agent platform.
#[derive(Debug, Clone)]
pub struct VoicePlatformConfig {
    /// Base URL of the platform API (e.g., "https://api.retellai.com").
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Voice used when provisioning new agents.
    pub voice_id: String,
    /// Language used when provisioning new agents.
    pub language: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VoicePlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.retellai.com".to_string(),
            api_key: String::new(),
            voice_id: "11labs-Adrian".to_string(),
            language: "en-US".to_string(),
            timeout_secs: 30,
        }
    }
}

impl VoicePlatformConfig {
    /// Create a configuration with the given base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required: `VOICE_API_KEY`. Optional: `VOICE_API_URL`, `VOICE_ID`,
    /// `VOICE_LANGUAGE`, `VOICE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, VoiceError> {
        let api_key = env::var("VOICE_API_KEY")
            .map_err(|_| VoiceError::Config("VOICE_API_KEY not set".to_string()))?;

        let defaults = Self::default();
        Ok(Self {
            base_url: env::var("VOICE_API_URL").unwrap_or(defaults.base_url),
            api_key,
            voice_id: env::var("VOICE_ID").unwrap_or(defaults.voice_id),
            language: env::var("VOICE_LANGUAGE").unwrap_or(defaults.language),
            timeout_secs: env::var("VOICE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        })
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Get the LLM update endpoint URL.
    pub fn update_llm_url(&self, llm_id: &str) -> String {
        format!("{}/update-retell-llm/{}", self.base(), urlencoding::encode(llm_id))
    }

    /// Get the LLM creation endpoint URL.
    pub fn create_llm_url(&self) -> String {
        format!("{}/create-retell-llm", self.base())
    }

    /// Get the agent creation endpoint URL.
    pub fn create_agent_url(&self) -> String {
        format!("{}/create-agent", self.base())
    }

    /// Get the web call registration endpoint URL.
    pub fn create_web_call_url(&self) -> String {
        format!("{}/v2/create-web-call", self.base())
    }

    /// Get the call retrieval endpoint URL.
    pub fn get_call_url(&self, call_id: &str) -> String {
        format!("{}/v2/get-call/{}", self.base(), urlencoding::encode(call_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let config = VoicePlatformConfig::new("http://localhost:9000/", "key");

        assert_eq!(config.update_llm_url("llm_1"), "http://localhost:9000/update-retell-llm/llm_1");
        assert_eq!(config.create_llm_url(), "http://localhost:9000/create-retell-llm");
        assert_eq!(config.create_agent_url(), "http://localhost:9000/create-agent");
        assert_eq!(config.create_web_call_url(), "http://localhost:9000/v2/create-web-call");
        assert_eq!(config.get_call_url("a/b"), "http://localhost:9000/v2/get-call/a%2Fb");
    }

    #[test]
    fn test_defaults() {
        let config = VoicePlatformConfig::default();
        assert_eq!(config.base_url, "https://api.retellai.com");
        assert_eq!(config.voice_id, "11labs-Adrian");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_voice_vars() {
            for key in [
                "VOICE_API_KEY",
                "VOICE_API_URL",
                "VOICE_ID",
                "VOICE_LANGUAGE",
                "VOICE_TIMEOUT_SECS",
            ] {
                std::env::remove_var(key);
            }
        }

        clear_all_voice_vars();
        assert!(matches!(
            VoicePlatformConfig::from_env(),
            Err(VoiceError::Config(_))
        ));

        std::env::set_var("VOICE_API_KEY", "env-key");
        std::env::set_var("VOICE_ID", "11labs-Rachel");
        std::env::set_var("VOICE_TIMEOUT_SECS", "10");
        let config = VoicePlatformConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.voice_id, "11labs-Rachel");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.timeout_secs, 10);

        clear_all_voice_vars();
    }
}
