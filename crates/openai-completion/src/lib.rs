//! OpenAI-compatible chat-completion client.
//!
//! Implements [`console_core::CompletionService`] over the
//! `/v1/chat/completions` endpoint. Requests default to the configured
//! model, temperature and token limit; a request can override the latter
//! two and ask for a JSON object response.
//!
//! ```rust,no_run
//! use console_core::{ChatMessage, CompletionRequest, CompletionService};
//! use openai_completion::OpenAiCompletion;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAiCompletion::from_env()?;
//!     let reply = client
//!         .complete(CompletionRequest::text(vec![ChatMessage::user("Hello")]))
//!         .await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::OpenAiCompletion;
pub use config::{OpenAiConfig, OpenAiConfigBuilder};
