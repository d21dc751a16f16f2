//! Application state shared across handlers.

use std::sync::Arc;

use console::Console;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Console workflows.
    pub console: Arc<Console>,
    /// Origin used in share links.
    pub public_base_url: Arc<str>,
}

impl AppState {
    /// Create new application state.
    pub fn new(console: Console, public_base_url: impl Into<String>) -> Self {
        Self {
            console: Arc::new(console),
            public_base_url: Arc::from(public_base_url.into()),
        }
    }
}
