//! Direct edits to restaurant facts and per-mode bot settings.

use std::sync::Arc;

use console_core::template::resolve_prompt;
use console_core::{
    AgentConfig, ConsoleError, Mode, ModeField, ModeSettings, ProfileUpdate, RestaurantInfo,
    UserProfile,
};
use console_database::validation;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sync::{load_or_new, AgentSync};

/// Bot settings to change for one mode. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotSettingsUpdate {
    pub bot_name: Option<String>,
    pub tone: Option<String>,
    pub model: Option<String>,
    pub begin_message: Option<String>,
    pub call_transfer_number: Option<String>,
}

impl BotSettingsUpdate {
    fn validate(&self) -> Result<(), ConsoleError> {
        if let Some(name) = &self.bot_name {
            validation::validate_bot_name(name)?;
        }
        if let Some(tone) = &self.tone {
            validation::validate_tone(tone)?;
        }
        if let Some(model) = &self.model {
            validation::validate_model_length(model)?;
        }
        if let Some(message) = &self.begin_message {
            validation::validate_begin_message(message)?;
        }
        if let Some(number) = &self.call_transfer_number {
            validation::validate_phone_number(number)?;
        }
        Ok(())
    }

    fn fields(&self) -> impl Iterator<Item = (ModeField, &str)> + '_ {
        [
            (ModeField::BotName, &self.bot_name),
            (ModeField::Tone, &self.tone),
            (ModeField::Model, &self.model),
            (ModeField::BeginMessage, &self.begin_message),
            (ModeField::CallTransferNumber, &self.call_transfer_number),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v.trim())))
    }
}

/// Restaurant facts to change. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestaurantInfoUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub seating_capacity: Option<u32>,
    pub menu: Option<String>,
}

impl RestaurantInfoUpdate {
    fn validate(&self) -> Result<(), ConsoleError> {
        if let Some(name) = &self.name {
            validation::validate_restaurant_name(name)?;
        }
        if let Some(address) = &self.address {
            validation::validate_address(address)?;
        }
        if let Some(capacity) = self.seating_capacity {
            validation::validate_seating_capacity(capacity)?;
        }
        if let Some(menu) = &self.menu {
            validation::validate_menu(menu)?;
        }
        Ok(())
    }

    fn to_update(&self) -> ProfileUpdate {
        let mut update = ProfileUpdate::new();
        if let Some(name) = &self.name {
            update = update.restaurant_name(name.trim());
        }
        if let Some(address) = &self.address {
            update = update.address(address.trim());
        }
        if let Some(capacity) = self.seating_capacity {
            update = update.seating_capacity(capacity);
        }
        if let Some(menu) = &self.menu {
            update = update.menu(menu.trim());
        }
        update
    }
}

/// The prompt in effect for a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptView {
    pub prompt: String,
    /// Whether the prompt is a stored override rather than the default.
    pub is_custom: bool,
}

impl PromptView {
    /// Build the view for a mode.
    pub fn of(profile: &UserProfile, mode: Mode) -> Self {
        let is_custom = profile
            .mode(mode)
            .general_prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        Self {
            prompt: resolve_prompt(profile, mode),
            is_custom,
        }
    }
}

/// Outcome of a restaurant edit: the stored facts and per-mode sync results.
#[derive(Debug)]
pub struct RestaurantUpdateOutcome {
    pub restaurant: RestaurantInfo,
    pub synced: Vec<(Mode, Result<AgentConfig, ConsoleError>)>,
}

/// Edits settings and keeps the voice platform in step.
pub struct SettingsService {
    sync: Arc<AgentSync>,
}

impl SettingsService {
    /// Create a settings service.
    pub fn new(sync: Arc<AgentSync>) -> Self {
        Self { sync }
    }

    /// Change bot settings for a mode.
    ///
    /// When the mode is provisioned the new configuration is pushed first,
    /// and settings plus the applied configuration are persisted together.
    /// A rejected push persists nothing.
    pub async fn update_bot_settings(
        &self,
        user_id: &str,
        mode: Mode,
        changes: BotSettingsUpdate,
    ) -> Result<ModeSettings, ConsoleError> {
        changes.validate()?;

        let mut profile = load_or_new(self.sync.store(), user_id).await?;
        let mut update = ProfileUpdate::new();
        {
            let settings = profile.mode_mut(mode);
            for (field, value) in changes.fields() {
                let slot = match field {
                    ModeField::BotName => &mut settings.bot_name,
                    ModeField::Tone => &mut settings.tone,
                    ModeField::Model => &mut settings.model,
                    ModeField::BeginMessage => &mut settings.begin_message,
                    ModeField::CallTransferNumber => &mut settings.call_transfer_number,
                    ModeField::GeneralPrompt => &mut settings.general_prompt,
                };
                *slot = Some(value.to_string());
                update = update.mode_field(mode, field, value);
            }
        }

        if update.is_empty() {
            return Ok(profile.mode(mode).clone());
        }

        if profile.mode(mode).llm.is_some() {
            let config = self.sync.push(&profile, mode).await?;
            update = update.agent_config(mode, &config)?;
            profile.mode_mut(mode).llm = Some(config);
        }

        self.sync.store().merge(user_id, update).await?;
        info!(user_id = %user_id, mode = %mode, "Bot settings updated");
        Ok(profile.mode(mode).clone())
    }

    /// Change restaurant facts and resync every provisioned mode.
    pub async fn update_restaurant_info(
        &self,
        user_id: &str,
        changes: RestaurantInfoUpdate,
    ) -> Result<RestaurantUpdateOutcome, ConsoleError> {
        changes.validate()?;

        let update = changes.to_update();
        if !update.is_empty() {
            self.sync.store().merge(user_id, update).await?;
            info!(user_id = %user_id, "Restaurant info updated");
        }

        let synced = match self.sync.sync_all(user_id).await {
            Ok(synced) => synced,
            Err(ConsoleError::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        let restaurant = load_or_new(self.sync.store(), user_id).await?.restaurant;

        Ok(RestaurantUpdateOutcome { restaurant, synced })
    }

    /// Drop the mode's prompt override and push the generated default.
    ///
    /// Returns `None` when the mode is not provisioned.
    pub async fn reset_prompt(
        &self,
        user_id: &str,
        mode: Mode,
    ) -> Result<Option<AgentConfig>, ConsoleError> {
        self.sync
            .store()
            .merge(user_id, ProfileUpdate::new().clear_prompt_override(mode))
            .await?;
        info!(user_id = %user_id, mode = %mode, "Prompt reset to default");

        match self.sync.sync_agent(user_id, mode).await {
            Ok(config) => Ok(Some(config)),
            Err(ConsoleError::NotProvisioned { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{provisioned_profile, services};
    use console_core::ProfileStore;
    use console_core::template::default_prompt;

    #[tokio::test]
    async fn test_bot_settings_push_then_persist_once() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        let settings = SettingsService::new(Arc::new(AgentSync::new(store.clone(), platform.clone())));

        let updated = settings
            .update_bot_settings(
                "owner-1",
                Mode::Customer,
                BotSettingsUpdate {
                    tone: Some(" playful ".to_string()),
                    begin_message: Some("Ciao!".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.tone.as_deref(), Some("playful"));
        let pushed = &platform.updates()[0].1;
        assert!(pushed.general_prompt.contains("maintain a playful tone"));
        assert_eq!(pushed.begin_message, "Ciao!");
        assert_eq!(store.writes(), 1);

        let profile = store.get("owner-1").await.unwrap();
        assert_eq!(profile.mode(Mode::Customer).tone.as_deref(), Some("playful"));
        assert_eq!(
            profile.mode(Mode::Customer).llm.as_ref().unwrap().begin_message.as_deref(),
            Some("Ciao!")
        );
    }

    #[tokio::test]
    async fn test_rejected_push_persists_nothing() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        platform.fail_updates(400, "bad model");
        let settings = SettingsService::new(Arc::new(AgentSync::new(store.clone(), platform)));

        let result = settings
            .update_bot_settings(
                "owner-1",
                Mode::Customer,
                BotSettingsUpdate {
                    model: Some("not-a-model".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ConsoleError::UpstreamConfig { .. })));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let (store, platform) = services();
        let settings = SettingsService::new(Arc::new(AgentSync::new(store.clone(), platform)));

        for changes in [
            BotSettingsUpdate {
                bot_name: Some("  ".to_string()),
                ..Default::default()
            },
            BotSettingsUpdate {
                call_transfer_number: Some("call me".to_string()),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                settings.update_bot_settings("owner-1", Mode::Sales, changes).await,
                Err(ConsoleError::Validation(_))
            ));
        }
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_unprovisioned_mode_only_persists() {
        let (store, platform) = services();
        let settings = SettingsService::new(Arc::new(AgentSync::new(store.clone(), platform.clone())));

        settings
            .update_bot_settings(
                "new-owner",
                Mode::Operations,
                BotSettingsUpdate {
                    bot_name: Some("Ops".to_string()),
                    call_transfer_number: Some("+1 415 555 0100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(platform.updates().is_empty());
        let profile = store.get("new-owner").await.unwrap();
        assert_eq!(profile.mode(Mode::Operations).bot_name.as_deref(), Some("Ops"));
        assert_eq!(
            profile.mode(Mode::Operations).call_transfer_number.as_deref(),
            Some("+1 415 555 0100")
        );
    }

    #[tokio::test]
    async fn test_restaurant_update_resyncs_provisioned_modes() {
        let (store, platform) = services();
        store.insert_profile(&provisioned_profile("owner-1")).unwrap();
        let settings = SettingsService::new(Arc::new(AgentSync::new(store.clone(), platform.clone())));

        let outcome = settings
            .update_restaurant_info(
                "owner-1",
                RestaurantInfoUpdate {
                    seating_capacity: Some(50),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.restaurant.seating_capacity, Some(50));
        assert_eq!(outcome.synced.len(), 1);
        assert!(platform.updates()[0].1.general_prompt.contains("Seating Capacity: 50"));

        assert!(matches!(
            settings
                .update_restaurant_info(
                    "owner-1",
                    RestaurantInfoUpdate {
                        seating_capacity: Some(0),
                        ..Default::default()
                    },
                )
                .await,
            Err(ConsoleError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_prompt() {
        let (store, platform) = services();
        let mut profile = provisioned_profile("owner-1");
        profile.mode_mut(Mode::Customer).general_prompt = Some("Custom {{botName}}".to_string());
        store.insert_profile(&profile).unwrap();
        let settings = SettingsService::new(Arc::new(AgentSync::new(store.clone(), platform.clone())));

        assert!(settings.reset_prompt("owner-1", Mode::Customer).await.unwrap().is_some());
        let profile = store.get("owner-1").await.unwrap();
        let view = PromptView::of(&profile, Mode::Customer);
        assert!(!view.is_custom);
        assert_eq!(view.prompt, default_prompt(Mode::Customer));

        assert!(settings.reset_prompt("owner-1", Mode::Sales).await.unwrap().is_none());
    }
}
