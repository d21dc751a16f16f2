//! Core types and traits for the restaurant voice-agent console.
//!
//! This crate provides the shared vocabulary for every other crate in the
//! workspace. It defines:
//!
//! - [`Mode`] / [`ModeTable`] - The three calling modes and a typed per-mode record
//! - [`UserProfile`] - The stored restaurant profile with its per-mode settings
//! - [`template`] - Default prompt generation and placeholder substitution
//! - [`ProfileStore`] - The trait for the document store adapter
//! - [`CompletionService`] - The trait for the chat-completion endpoint
//! - [`VoicePlatform`] / [`CallTransport`] - Traits for the voice-agent platform
//! - [`ConsoleError`] - The shared error taxonomy
//!
//! # Example
//!
//! ```rust
//! use console_core::{template, Mode, UserProfile};
//!
//! let mut profile = UserProfile::default();
//! profile.restaurant.name = Some("Luigi's".to_string());
//!
//! let prompt = template::resolve_prompt(&profile, Mode::Customer);
//! assert!(prompt.contains("{{restaurantName}}"));
//! ```

mod completion;
mod error;
mod mode;
mod profile;
mod store;
pub mod template;
mod voice;

pub use completion::{ChatMessage, CompletionRequest, CompletionService, ResponseFormat};
pub use error::ConsoleError;
pub use mode::{Mode, ModeField, ModeTable};
pub use profile::{ModeSettings, ProtectedField, RestaurantInfo, UserProfile};
pub use store::{merge_documents, ProfileStore, ProfileUpdate};
pub use template::{Placeholder, PromptTemplate};
pub use voice::{
    AgentConfig, AgentSpec, CallAnalysis, CallRecord, CallStatus, CallTransport, LlmUpdate,
    SessionEvent, VoiceAgent, VoicePlatform, WebCall,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
