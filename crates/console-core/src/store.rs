//! The profile document store trait and partial-update builder.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConsoleError;
use crate::mode::{Mode, ModeField};
use crate::profile::UserProfile;
use crate::voice::{AgentConfig, CallRecord, VoiceAgent};

/// Per-user document storage with deep-merge writes.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a user's profile. Fails with [`ConsoleError::NotFound`] when
    /// no document exists.
    async fn get(&self, user_id: &str) -> Result<UserProfile, ConsoleError>;

    /// Merge a partial document into the user's stored document, creating
    /// it when absent. Fields the update does not name are preserved.
    async fn merge(&self, user_id: &str, update: ProfileUpdate) -> Result<(), ConsoleError>;

    /// Check whether a document exists for the user.
    async fn exists(&self, user_id: &str) -> Result<bool, ConsoleError>;
}

/// A partial profile document built field by field.
///
/// A `null` leaf removes the stored key when merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    document: Map<String, Value>,
}

impl ProfileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the restaurant name.
    pub fn restaurant_name(self, name: impl Into<String>) -> Self {
        self.set(&["restaurant", "name"], Value::String(name.into()))
    }

    /// Set the restaurant address.
    pub fn address(self, address: impl Into<String>) -> Self {
        self.set(&["restaurant", "address"], Value::String(address.into()))
    }

    /// Set the seating capacity.
    pub fn seating_capacity(self, capacity: u32) -> Self {
        self.set(&["restaurant", "seating_capacity"], Value::from(capacity))
    }

    /// Set the menu text.
    pub fn menu(self, menu: impl Into<String>) -> Self {
        self.set(&["restaurant", "menu"], Value::String(menu.into()))
    }

    /// Set a scalar setting for one mode.
    pub fn mode_field(self, mode: Mode, field: ModeField, value: impl Into<String>) -> Self {
        self.set(
            &["modes", mode.as_str(), field.key()],
            Value::String(value.into()),
        )
    }

    /// Store a prompt override for a mode.
    pub fn prompt_override(self, mode: Mode, prompt: impl Into<String>) -> Self {
        self.mode_field(mode, ModeField::GeneralPrompt, prompt)
    }

    /// Remove a mode's prompt override so the generated default applies.
    pub fn clear_prompt_override(self, mode: Mode) -> Self {
        self.set(
            &["modes", mode.as_str(), ModeField::GeneralPrompt.key()],
            Value::Null,
        )
    }

    /// Store the platform's applied configuration for a mode.
    pub fn agent_config(self, mode: Mode, config: &AgentConfig) -> Result<Self, ConsoleError> {
        self.set_serialized(&["modes", mode.as_str(), "llm"], config)
    }

    /// Store the provisioned voice agent for a mode.
    pub fn voice_agent(self, mode: Mode, agent: &VoiceAgent) -> Result<Self, ConsoleError> {
        self.set_serialized(&["modes", mode.as_str(), "agent"], agent)
    }

    /// Store a call record under `analytics[mode][call_id]`.
    pub fn call_record(self, mode: Mode, record: &CallRecord) -> Result<Self, ConsoleError> {
        let call_id = record.call_id.clone();
        self.set_serialized(&["analytics", mode.as_str(), &call_id], record)
    }

    /// Whether the update names no fields.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Borrow the partial document.
    pub fn as_document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Consume the update, returning the partial document.
    pub fn into_document(self) -> Value {
        Value::Object(self.document)
    }

    fn set_serialized<T: Serialize>(self, path: &[&str], value: &T) -> Result<Self, ConsoleError> {
        let value = serde_json::to_value(value).map_err(|e| {
            ConsoleError::Store(format!("failed to serialize {}: {}", path.join("."), e))
        })?;
        Ok(self.set(path, value))
    }

    fn set(mut self, path: &[&str], value: Value) -> Self {
        let nested = path.iter().rev().fold(value, |inner, key| {
            let mut map = Map::new();
            map.insert(key.to_string(), inner);
            Value::Object(map)
        });
        if let Value::Object(nested) = nested {
            insert_nested(&mut self.document, nested);
        }
        self
    }
}

fn insert_nested(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Object(inner) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => insert_nested(existing, inner),
                _ => {
                    target.insert(key, Value::Object(inner));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

/// Recursively merge `patch` into `target`.
///
/// Objects merge key by key, `null` removes the key, and any other value
/// replaces what was there.
pub fn merge_documents(target: &mut Value, patch: Value) {
    match patch {
        Value::Object(patch) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(target) = target {
                for (key, value) in patch {
                    if value.is_null() {
                        target.remove(&key);
                        continue;
                    }
                    merge_documents(target.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        other => *target = other,
    }
}
