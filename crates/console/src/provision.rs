//! Creating a mode's LLM configuration and voice agent.

use std::sync::Arc;

use console_core::{
    AgentSpec, ConsoleError, Mode, ProfileStore, ProfileUpdate, VoiceAgent, VoicePlatform,
};
use tracing::info;

use crate::sync::{build_llm_update, load_or_new};

/// Provisions voice agents on the platform.
pub struct Provisioner {
    store: Arc<dyn ProfileStore>,
    platform: Arc<dyn VoicePlatform>,
    voice_id: String,
    language: String,
    default_model: String,
}

impl Provisioner {
    /// Create a provisioner.
    pub fn new(
        store: Arc<dyn ProfileStore>,
        platform: Arc<dyn VoicePlatform>,
        voice_id: impl Into<String>,
        language: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            voice_id: voice_id.into(),
            language: language.into(),
            default_model: default_model.into(),
        }
    }

    /// Create the LLM configuration and voice agent for a mode.
    ///
    /// An LLM configuration left over from an earlier attempt is updated
    /// rather than duplicated. Each platform object is persisted as soon as
    /// it exists.
    pub async fn provision_mode(&self, user_id: &str, mode: Mode) -> Result<VoiceAgent, ConsoleError> {
        let profile = load_or_new(self.store.as_ref(), user_id).await?;
        let settings = profile.mode(mode);
        if settings.agent.is_some() {
            return Err(ConsoleError::AlreadyProvisioned(mode));
        }

        let update = build_llm_update(&profile, mode, Some(&self.default_model))?;
        let llm = match &settings.llm {
            Some(existing) => self.platform.update_llm(&existing.llm_id, &update).await?,
            None => self.platform.create_llm(&update).await?,
        };
        self.store
            .merge(user_id, ProfileUpdate::new().agent_config(mode, &llm)?)
            .await?;
        info!(user_id = %user_id, mode = %mode, llm_id = %llm.llm_id, "LLM configuration provisioned");

        let llm_websocket_url = llm.llm_websocket_url.clone().ok_or_else(|| {
            ConsoleError::Upstream {
                status: 200,
                message: format!("LLM configuration {} has no websocket URL", llm.llm_id),
            }
        })?;

        let agent_name = settings.bot_name.clone().unwrap_or_else(|| {
            format!(
                "{} {}",
                profile.restaurant.name.as_deref().unwrap_or("Restaurant"),
                mode.display_name()
            )
        });

        let agent = self
            .platform
            .create_agent(&AgentSpec {
                llm_websocket_url,
                agent_name,
                voice_id: self.voice_id.clone(),
                language: self.language.clone(),
            })
            .await?;
        self.store
            .merge(user_id, ProfileUpdate::new().voice_agent(mode, &agent)?)
            .await?;
        info!(user_id = %user_id, mode = %mode, agent_id = %agent.agent_id, "Voice agent provisioned");

        Ok(agent)
    }
}
