//! Client for the voice-agent platform.
//!
//! This crate provides:
//!
//! - [`VoiceClient`] - REST client for LLM configs, agents, web calls and
//!   call retrieval, implementing [`console_core::VoicePlatform`]
//! - [`RelayTransport`] - a [`console_core::CallTransport`] for media
//!   sessions owned by the browser
//!
//! # Example
//!
//! ```rust,no_run
//! use voice_platform::{VoiceClient, VoicePlatformConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VoiceClient::new(VoicePlatformConfig::new(
//!         "https://api.retellai.com",
//!         "key_123",
//!     ))?;
//!     let call = client.register_web_call("agent_abc").await?;
//!     println!("Join with token {}", call.access_token);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod relay;
mod types;

pub use client::VoiceClient;
pub use config::VoicePlatformConfig;
pub use error::VoiceError;
pub use relay::RelayTransport;
