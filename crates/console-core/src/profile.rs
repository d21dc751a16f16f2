//! The stored restaurant profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mode::{Mode, ModeTable};
use crate::voice::{AgentConfig, CallRecord, VoiceAgent};

/// Facts about the restaurant shared by every mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantInfo {
    pub name: Option<String>,
    pub address: Option<String>,
    pub seating_capacity: Option<u32>,
    pub menu: Option<String>,
}

/// Settings for one mode's calling agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    pub bot_name: Option<String>,
    pub tone: Option<String>,
    pub model: Option<String>,
    pub begin_message: Option<String>,
    pub call_transfer_number: Option<String>,
    /// User-edited prompt template; the generated default applies when unset.
    pub general_prompt: Option<String>,
    /// Configuration last applied on the voice platform.
    pub llm: Option<AgentConfig>,
    /// Voice agent used to place calls.
    pub agent: Option<VoiceAgent>,
}

/// A restaurant owner's full configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Identity key. Not part of the stored document.
    #[serde(skip)]
    pub user_id: String,
    pub restaurant: RestaurantInfo,
    pub modes: ModeTable<ModeSettings>,
    /// Call records per mode, keyed by call id.
    pub analytics: ModeTable<BTreeMap<String, CallRecord>>,
}

impl UserProfile {
    /// Create an empty profile for a user.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Settings for a mode.
    pub fn mode(&self, mode: Mode) -> &ModeSettings {
        self.modes.get(mode)
    }

    /// Mutable settings for a mode.
    pub fn mode_mut(&mut self, mode: Mode) -> &mut ModeSettings {
        self.modes.get_mut(mode)
    }

    /// Stored call records for a mode.
    pub fn calls(&self, mode: Mode) -> &BTreeMap<String, CallRecord> {
        self.analytics.get(mode)
    }
}

/// Core configuration values that the conversational editor must not touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedField {
    RestaurantName,
    SeatingCapacity,
    Address,
    Menu,
    BotName,
    Tone,
    BeginMessage,
    Model,
}

impl ProtectedField {
    /// Every protected field.
    pub const ALL: [ProtectedField; 8] = [
        ProtectedField::RestaurantName,
        ProtectedField::SeatingCapacity,
        ProtectedField::Address,
        ProtectedField::Menu,
        ProtectedField::BotName,
        ProtectedField::Tone,
        ProtectedField::BeginMessage,
        ProtectedField::Model,
    ];

    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProtectedField::RestaurantName => "restaurant name",
            ProtectedField::SeatingCapacity => "seating capacity",
            ProtectedField::Address => "address",
            ProtectedField::Menu => "menu",
            ProtectedField::BotName => "bot name",
            ProtectedField::Tone => "tone",
            ProtectedField::BeginMessage => "begin message",
            ProtectedField::Model => "model",
        }
    }

    /// Comma-separated list of all protected fields, e.g. for instructions.
    pub fn describe_all() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|f| f.display_name()).collect();
        match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
            _ => names.join(""),
        }
    }
}
