//! Workflows for the restaurant voice-agent console.
//!
//! This crate wires the document store, the completion endpoint and the
//! voice platform into the operations the console exposes:
//!
//! - [`AgentSync`] - push a mode's effective configuration to the platform
//! - [`PromptEditor`] - conversational prompt editing with confirmation
//! - [`CallSessionManager`] - live calls and post-call analytics retrieval
//! - [`SettingsService`] - direct edits to restaurant facts and bot settings
//! - [`Provisioner`] - create a mode's LLM configuration and voice agent
//! - [`PromptImprover`] - rewrite a prompt from recorded calls
//!
//! # Architecture
//!
//! ```text
//!   settings / editor / improver
//!              │
//!              ▼
//!   ┌──────────────────────┐      ┌──────────────────┐
//!   │      AgentSync       │─────▶│  VoicePlatform   │
//!   │ resolve → substitute │      └──────────────────┘
//!   │ → update_llm → merge │               ▲
//!   └──────────────────────┘               │
//!              │                 ┌──────────────────┐
//!              ▼                 │CallSessionManager│──▶ CallTransport
//!   ┌──────────────────────┐     │  + analytics poll│
//!   │     ProfileStore     │◀────└──────────────────┘
//!   └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use console::{Console, ConsoleConfig, ConsoleServices};
//!
//! let console = Console::new(
//!     ConsoleServices { store, completion, platform, transport },
//!     ConsoleConfig::from_env(),
//! );
//!
//! let reply = console.editor().send_message("owner-1", Mode::Customer, "be more casual").await?;
//! println!("{}", reply.reply);
//! console.editor().confirm("owner-1", Mode::Customer).await?;
//! ```

mod analytics;
mod calls;
mod config;
mod editor;
mod improve;
mod proposal;
mod provision;
mod settings;
mod share;
mod sync;

use std::sync::Arc;

use console_core::{
    CallTransport, CompletionService, ConsoleError, ProfileStore, UserProfile, VoicePlatform,
};

pub use analytics::{list_calls, CallFilter};
pub use calls::{
    fetch_analytics, store_call_record, CallSession, CallSessionManager, PollPolicy,
    SessionHandle, TranscriptLine,
};
pub use config::{ConsoleConfig, ConsoleConfigBuilder};
pub use editor::{ConfirmOutcome, EditorReply, EditorSnapshot, EditorState, PromptEditor};
pub use improve::{ImprovedPrompt, PromptImprover, MAX_CALLS_PER_IMPROVEMENT};
pub use proposal::{parse_proposal, PendingChange};
pub use provision::Provisioner;
pub use settings::{
    BotSettingsUpdate, PromptView, RestaurantInfoUpdate, RestaurantUpdateOutcome,
    SettingsService,
};
pub use share::{share_links, shared_session, ShareLinks, SharedSession};
pub use sync::{build_llm_update, AgentSync};

/// External services the console runs against.
pub struct ConsoleServices {
    pub store: Arc<dyn ProfileStore>,
    pub completion: Arc<dyn CompletionService>,
    pub platform: Arc<dyn VoicePlatform>,
    pub transport: Arc<dyn CallTransport>,
}

/// Every console workflow, built once per application.
pub struct Console {
    store: Arc<dyn ProfileStore>,
    sync: Arc<AgentSync>,
    editor: PromptEditor,
    calls: CallSessionManager,
    settings: SettingsService,
    provisioner: Provisioner,
    improver: PromptImprover,
}

impl Console {
    /// Build the workflows over the given services.
    pub fn new(services: ConsoleServices, config: ConsoleConfig) -> Self {
        let ConsoleServices {
            store,
            completion,
            platform,
            transport,
        } = services;

        let sync = Arc::new(AgentSync::new(store.clone(), platform.clone()));
        let policy = PollPolicy {
            max_attempts: config.analytics_max_attempts,
            interval: config.analytics_interval,
        };

        Self {
            editor: PromptEditor::new(
                completion.clone(),
                sync.clone(),
                config.max_editor_sessions,
                config.verify_placeholders,
            ),
            calls: CallSessionManager::new(platform.clone(), transport, store.clone(), policy),
            settings: SettingsService::new(sync.clone()),
            provisioner: Provisioner::new(
                store.clone(),
                platform,
                config.voice_id,
                config.voice_language,
                config.default_model,
            ),
            improver: PromptImprover::new(completion, sync.clone(), config.verify_placeholders),
            store,
            sync,
        }
    }

    /// The document store.
    pub fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    /// A user's profile, empty if nothing has been stored yet.
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, ConsoleError> {
        sync::load_or_new(self.store.as_ref(), user_id).await
    }

    /// Agent sync.
    pub fn sync(&self) -> &AgentSync {
        &self.sync
    }

    /// The prompt editor.
    pub fn editor(&self) -> &PromptEditor {
        &self.editor
    }

    /// The call session manager.
    pub fn calls(&self) -> &CallSessionManager {
        &self.calls
    }

    /// The settings service.
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// The provisioner.
    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    /// The prompt improver.
    pub fn improver(&self) -> &PromptImprover {
        &self.improver
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use console_core::{AgentConfig, Mode, UserProfile, VoiceAgent};
    use mock_services::{MemoryStore, MockVoicePlatform};

    pub fn services() -> (Arc<MemoryStore>, Arc<MockVoicePlatform>) {
        (Arc::new(MemoryStore::new()), Arc::new(MockVoicePlatform::new()))
    }

    /// Luigi's with complete customer-mode settings and nothing provisioned.
    pub fn luigis(user_id: &str) -> UserProfile {
        let mut profile = UserProfile::new(user_id);
        profile.restaurant.name = Some("Luigi's".to_string());
        profile.restaurant.seating_capacity = Some(40);
        profile.restaurant.address = Some("12 Mulberry St".to_string());
        profile.restaurant.menu = Some("Margherita, Carbonara".to_string());

        let customer = profile.mode_mut(Mode::Customer);
        customer.bot_name = Some("Mia".to_string());
        customer.tone = Some("friendly".to_string());
        customer.model = Some("gpt-4o".to_string());
        customer.begin_message = Some("Hi, this is Mia from Luigi's!".to_string());
        profile
    }

    /// [`luigis`] with the customer mode provisioned.
    pub fn provisioned_profile(user_id: &str) -> UserProfile {
        let mut profile = luigis(user_id);
        let customer = profile.mode_mut(Mode::Customer);
        customer.llm = Some(AgentConfig {
            llm_id: "llm_customer".to_string(),
            llm_websocket_url: Some("wss://mock.voice/llm/llm_customer".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        });
        customer.agent = Some(VoiceAgent {
            agent_id: "agent_customer".to_string(),
            ..Default::default()
        });
        profile
    }
}
