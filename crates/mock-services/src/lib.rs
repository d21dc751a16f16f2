//! Test doubles for the console's external services.
//!
//! This crate provides in-memory implementations of the `console-core`
//! traits for testing:
//! - `ScriptedCompletion` - replays queued completion replies
//! - `MockVoicePlatform` - records pushes and scripts call retrieval
//! - `MemoryStore` - document store with write counting
//! - `MockTransport` - records media session starts and stops
//!
//! # Example
//!
//! ```rust
//! use mock_services::{MemoryStore, ProfileStore, ProfileUpdate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_services::ConsoleError> {
//!     let store = MemoryStore::new();
//!     store.merge("owner-1", ProfileUpdate::new().restaurant_name("Luigi's")).await?;
//!
//!     let profile = store.get("owner-1").await?;
//!     assert_eq!(profile.restaurant.name.as_deref(), Some("Luigi's"));
//!     assert_eq!(store.writes(), 1);
//!     Ok(())
//! }
//! ```

mod completion;
mod platform;
mod store;
mod transport;

// Re-export console-core types for convenience
pub use console_core::{
    async_trait, CallTransport, CompletionService, ConsoleError, ProfileStore, ProfileUpdate,
    VoicePlatform,
};

pub use completion::ScriptedCompletion;
pub use platform::MockVoicePlatform;
pub use store::MemoryStore;
pub use transport::MockTransport;
