//! Workflow settings for the console services.

use std::env;
use std::time::Duration;

/// Settings shared by the console workflows.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Number of post-call retrieval attempts before giving up.
    pub analytics_max_attempts: u32,

    /// Sleep before each retrieval attempt.
    pub analytics_interval: Duration,

    /// Reject edited prompts that drop a placeholder the current prompt has.
    pub verify_placeholders: bool,

    /// Editing sessions kept before the least recently used is evicted.
    pub max_editor_sessions: usize,

    /// Voice used when provisioning an agent.
    pub voice_id: String,

    /// Language used when provisioning an agent.
    pub voice_language: String,

    /// Model used when a mode has none configured at provisioning time.
    pub default_model: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            analytics_max_attempts: 10,
            analytics_interval: Duration::from_secs(5),
            verify_placeholders: false,
            max_editor_sessions: 1000,
            voice_id: "11labs-Adrian".to_string(),
            voice_language: "en-US".to_string(),
            default_model: "gpt-4o".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Load settings from environment variables, keeping defaults for
    /// anything unset or unparsable.
    ///
    /// - `ANALYTICS_MAX_ATTEMPTS` (default: 10)
    /// - `ANALYTICS_INTERVAL_SECS` (default: 5)
    /// - `EDITOR_VERIFY_PLACEHOLDERS` (default: false)
    /// - `EDITOR_MAX_SESSIONS` (default: 1000)
    /// - `VOICE_ID` (default: 11labs-Adrian)
    /// - `VOICE_LANGUAGE` (default: en-US)
    /// - `OPENAI_MODEL` (default: gpt-4o)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_parse::<u32>("ANALYTICS_MAX_ATTEMPTS") {
            config.analytics_max_attempts = value.max(1);
        }
        if let Some(value) = env_parse::<u64>("ANALYTICS_INTERVAL_SECS") {
            config.analytics_interval = Duration::from_secs(value);
        }
        if let Some(value) = env_bool("EDITOR_VERIFY_PLACEHOLDERS") {
            config.verify_placeholders = value;
        }
        if let Some(value) = env_parse::<usize>("EDITOR_MAX_SESSIONS") {
            config.max_editor_sessions = value.max(1);
        }
        if let Ok(value) = env::var("VOICE_ID") {
            config.voice_id = value;
        }
        if let Ok(value) = env::var("VOICE_LANGUAGE") {
            config.voice_language = value;
        }
        if let Ok(value) = env::var("OPENAI_MODEL") {
            config.default_model = value;
        }

        config
    }

    /// Create a new config builder.
    pub fn builder() -> ConsoleConfigBuilder {
        ConsoleConfigBuilder::default()
    }
}

/// Builder for ConsoleConfig.
#[derive(Debug, Default)]
pub struct ConsoleConfigBuilder {
    config: ConsoleConfig,
}

impl ConsoleConfigBuilder {
    /// Set the number of analytics attempts.
    pub fn analytics_max_attempts(mut self, attempts: u32) -> Self {
        self.config.analytics_max_attempts = attempts.max(1);
        self
    }

    /// Set the spacing between analytics attempts.
    pub fn analytics_interval(mut self, interval: Duration) -> Self {
        self.config.analytics_interval = interval;
        self
    }

    /// Enable or disable the placeholder guard.
    pub fn verify_placeholders(mut self, enabled: bool) -> Self {
        self.config.verify_placeholders = enabled;
        self
    }

    /// Set the editor session limit.
    pub fn max_editor_sessions(mut self, max: usize) -> Self {
        self.config.max_editor_sessions = max.max(1);
        self
    }

    /// Set the provisioning voice.
    pub fn voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.config.voice_id = voice_id.into();
        self
    }

    /// Set the provisioning language.
    pub fn voice_language(mut self, language: impl Into<String>) -> Self {
        self.config.voice_language = language.into();
        self
    }

    /// Set the fallback model.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConsoleConfig {
        self.config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}

fn env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
