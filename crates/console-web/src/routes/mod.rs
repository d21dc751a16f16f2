//! Route handlers for the console API.

pub mod analytics;
pub mod calls;
pub mod editor;
pub mod health;
pub mod profile;
pub mod shared;

use axum::routing::{get, post, put};
use axum::Router;
use console_core::Mode;

use crate::error::Result;
use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Profile and settings
        .route("/api/profile", get(profile::get_profile))
        .route("/api/restaurant", put(profile::update_restaurant))
        .route(
            "/api/modes/:mode/settings",
            get(profile::get_settings).put(profile::update_settings),
        )
        .route(
            "/api/modes/:mode/prompt",
            get(profile::get_prompt).delete(profile::reset_prompt),
        )
        .route("/api/modes/:mode/sync", post(profile::sync_mode))
        .route("/api/modes/:mode/provision", post(profile::provision_mode))
        // Prompt editor
        .route("/api/modes/:mode/editor", get(editor::snapshot))
        .route("/api/modes/:mode/editor/messages", post(editor::send_message))
        .route("/api/modes/:mode/editor/confirm", post(editor::confirm))
        .route("/api/modes/:mode/editor/reject", post(editor::reject))
        // Calls
        .route("/api/modes/:mode/calls", post(calls::start_call))
        .route("/api/calls/stop", post(calls::stop_call))
        .route("/api/calls/events", post(calls::session_event))
        .route("/api/calls/status", get(calls::status))
        // Analytics
        .route("/api/modes/:mode/analytics", get(analytics::list))
        .route("/api/modes/:mode/analytics/improve", post(analytics::improve))
        // Sharing
        .route("/api/modes/:mode/share", get(shared::share_links))
        .route("/shared/:user_id/:mode", get(shared::shared_page))
        .route("/shared/:user_id/:mode/calls", post(shared::start_call))
        .route("/shared/:user_id/:mode/calls/stop", post(shared::stop_call))
        .route("/shared/:user_id/:mode/calls/events", post(shared::session_event))
}

/// Parse the `:mode` path segment.
pub(crate) fn parse_mode(raw: &str) -> Result<Mode> {
    Ok(raw.parse::<Mode>()?)
}
