//! Pushing a mode's effective configuration to the voice platform.

use std::sync::Arc;

use console_core::template::{hash_prompt, resolve_prompt, substitute_placeholders};
use console_core::{
    AgentConfig, ConsoleError, LlmUpdate, Mode, ProfileStore, ProfileUpdate, UserProfile,
    VoicePlatform,
};
use tracing::{debug, info, warn};

/// Build the fields pushed for a mode.
///
/// The model comes from the mode's settings, then the platform's applied
/// configuration, then `fallback_model`. A missing begin message is sent
/// as an empty string.
pub fn build_llm_update(
    profile: &UserProfile,
    mode: Mode,
    fallback_model: Option<&str>,
) -> Result<LlmUpdate, ConsoleError> {
    let settings = profile.mode(mode);
    let template = resolve_prompt(profile, mode);
    let general_prompt = substitute_placeholders(&template, profile, mode)?;

    let model = settings
        .model
        .as_deref()
        .or_else(|| settings.llm.as_ref().and_then(|llm| llm.model.as_deref()))
        .or(fallback_model)
        .filter(|model| !model.trim().is_empty())
        .ok_or(ConsoleError::MissingField {
            field: "model",
            mode,
        })?;

    Ok(LlmUpdate {
        model: model.to_string(),
        general_prompt,
        begin_message: settings.begin_message.clone().unwrap_or_default(),
    })
}

/// Load a profile, treating a missing document as an empty one.
pub(crate) async fn load_or_new(
    store: &dyn ProfileStore,
    user_id: &str,
) -> Result<UserProfile, ConsoleError> {
    match store.get(user_id).await {
        Ok(profile) => Ok(profile),
        Err(ConsoleError::NotFound { .. }) => Ok(UserProfile::new(user_id)),
        Err(e) => Err(e),
    }
}

/// Re-applies stored settings to the voice platform.
pub struct AgentSync {
    store: Arc<dyn ProfileStore>,
    platform: Arc<dyn VoicePlatform>,
}

impl AgentSync {
    /// Create a sync service.
    pub fn new(store: Arc<dyn ProfileStore>, platform: Arc<dyn VoicePlatform>) -> Self {
        Self { store, platform }
    }

    /// The document store.
    pub fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    /// The voice platform.
    pub fn platform(&self) -> &dyn VoicePlatform {
        self.platform.as_ref()
    }

    /// Push a profile's configuration for one mode without persisting
    /// the result.
    pub async fn push(&self, profile: &UserProfile, mode: Mode) -> Result<AgentConfig, ConsoleError> {
        let llm_id = profile
            .mode(mode)
            .llm
            .as_ref()
            .map(|llm| llm.llm_id.clone())
            .ok_or(ConsoleError::NotProvisioned {
                mode,
                what: "LLM configuration",
            })?;

        let update = build_llm_update(profile, mode, None)?;
        info!(
            user_id = %profile.user_id,
            mode = %mode,
            llm_id = %llm_id,
            prompt_sha256 = %hash_prompt(&update.general_prompt),
            "Pushing agent configuration"
        );
        debug!(model = %update.model, begin_message = %update.begin_message, "Configuration fields");

        self.platform.update_llm(&llm_id, &update).await
    }

    /// Push and persist the configuration for one mode.
    pub async fn sync_agent(&self, user_id: &str, mode: Mode) -> Result<AgentConfig, ConsoleError> {
        let profile = self.store.get(user_id).await?;
        self.apply(&profile, mode).await
    }

    /// Sync every mode that has an LLM configuration.
    ///
    /// One mode failing does not stop the others.
    pub async fn sync_all(
        &self,
        user_id: &str,
    ) -> Result<Vec<(Mode, Result<AgentConfig, ConsoleError>)>, ConsoleError> {
        let profile = self.store.get(user_id).await?;
        let mut results = Vec::new();

        for mode in Mode::ALL {
            if profile.mode(mode).llm.is_none() {
                continue;
            }
            let result = self.apply(&profile, mode).await;
            if let Err(e) = &result {
                warn!(user_id = %user_id, mode = %mode, error = %e, "Mode sync failed");
            }
            results.push((mode, result));
        }

        Ok(results)
    }

    async fn apply(&self, profile: &UserProfile, mode: Mode) -> Result<AgentConfig, ConsoleError> {
        let config = self.push(profile, mode).await?;
        self.store
            .merge(
                &profile.user_id,
                ProfileUpdate::new().agent_config(mode, &config)?,
            )
            .await?;
        info!(user_id = %profile.user_id, mode = %mode, llm_id = %config.llm_id, "Agent configuration applied");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{provisioned_profile, services};

    #[tokio::test]
    async fn test_sync_agent_pushes_substituted_prompt() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        let sync = AgentSync::new(store.clone(), platform.clone());

        let config = sync.sync_agent("owner-1", Mode::Customer).await.unwrap();

        let updates = platform.updates();
        assert_eq!(updates.len(), 1);
        let (llm_id, update) = &updates[0];
        assert_eq!(llm_id, "llm_customer");
        assert!(update.general_prompt.contains("restaurant named Luigi's"));
        assert!(!update.general_prompt.contains("{{"));
        assert_eq!(update.model, "gpt-4o");
        assert_eq!(update.begin_message, "Hi, this is Mia from Luigi's!");

        let stored = store.get("owner-1").await.unwrap();
        assert_eq!(stored.mode(Mode::Customer).llm.as_ref(), Some(&config));
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        let sync = AgentSync::new(store.clone(), platform.clone());

        sync.sync_agent("owner-1", Mode::Customer).await.unwrap();
        sync.sync_agent("owner-1", Mode::Customer).await.unwrap();

        let updates = platform.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], updates[1]);
    }

    #[tokio::test]
    async fn test_sync_requires_llm() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        let sync = AgentSync::new(store.clone(), platform.clone());

        let err = sync.sync_agent("owner-1", Mode::Sales).await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::NotProvisioned {
                mode: Mode::Sales,
                ..
            }
        ));
        assert!(platform.updates().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_sync_unknown_user() {
        let (store, platform) = services();
        let sync = AgentSync::new(store, platform);

        assert!(matches!(
            sync.sync_agent("nobody", Mode::Customer).await,
            Err(ConsoleError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_not_persisted() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        platform.fail_updates(422, "prompt too long");
        let sync = AgentSync::new(store.clone(), platform.clone());

        let err = sync.sync_agent("owner-1", Mode::Customer).await.unwrap_err();
        assert!(matches!(err, ConsoleError::UpstreamConfig { status: 422, .. }));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_sync_all_covers_provisioned_modes() {
        let (store, platform) = services();
        let mut profile = provisioned_profile("owner-1");
        profile.mode_mut(Mode::Sales).llm = Some(AgentConfig {
            llm_id: "llm_sales".to_string(),
            ..Default::default()
        });
        store.insert_profile(&profile).unwrap();
        let sync = AgentSync::new(store.clone(), platform.clone());

        let results = sync.sync_all("owner-1").await.unwrap();
        let modes: Vec<Mode> = results.iter().map(|(mode, _)| *mode).collect();
        assert_eq!(modes, vec![Mode::Customer, Mode::Sales]);

        // Sales has no bot name, so substitution fails for that mode only.
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(ConsoleError::MissingField {
                field: "botName",
                ..
            })
        ));
        assert_eq!(platform.updates().len(), 1);
    }

    #[test]
    fn test_build_update_model_fallbacks() {
        let mut profile = provisioned_profile("owner-1");
        profile.mode_mut(Mode::Customer).model = None;

        let update = build_llm_update(&profile, Mode::Customer, None).unwrap();
        assert_eq!(update.model, "gpt-4o-mini", "falls back to the applied model");

        profile.mode_mut(Mode::Customer).llm = None;
        assert!(matches!(
            build_llm_update(&profile, Mode::Customer, None),
            Err(ConsoleError::MissingField { field: "model", .. })
        ));
        let update = build_llm_update(&profile, Mode::Customer, Some("gpt-4o")).unwrap();
        assert_eq!(update.model, "gpt-4o");

        profile.mode_mut(Mode::Customer).begin_message = None;
        let update = build_llm_update(&profile, Mode::Customer, Some("gpt-4o")).unwrap();
        assert_eq!(update.begin_message, "");
    }
}
