//! Share links and the public calling page.
//!
//! Shared routes act on the owner's call slot, so a shared page and the
//! owner's own test call cannot run at the same time.

use axum::extract::{Path, State};
use axum::Json;
use console::{CallSession, SessionHandle, ShareLinks, SharedSession};
use console_core::{ConsoleError, Mode};

use super::calls::EventRequest;
use super::parse_mode;
use crate::auth::UserId;
use crate::error::Result;
use crate::state::AppState;

/// Direct link and embed snippet for a mode.
pub async fn share_links(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<ShareLinks>> {
    let mode = parse_mode(&mode)?;
    Ok(Json(console::share_links(
        &state.public_base_url,
        &user_id,
        mode,
    )))
}

/// What the public page shows.
pub async fn shared_page(
    State(state): State<AppState>,
    Path((user_id, mode)): Path<(String, String)>,
) -> Result<Json<SharedSession>> {
    let mode = parse_mode(&mode)?;
    let profile = state.console.store().get(&user_id).await?;
    Ok(Json(console::shared_session(&profile, mode)?))
}

/// Start a call from the public page.
pub async fn start_call(
    State(state): State<AppState>,
    Path((user_id, mode)): Path<(String, String)>,
) -> Result<Json<SessionHandle>> {
    let mode = parse_mode(&mode)?;
    Ok(Json(state.console.calls().start_call(&user_id, mode).await?))
}

/// Stop the public page's call.
pub async fn stop_call(
    State(state): State<AppState>,
    Path((user_id, mode)): Path<(String, String)>,
) -> Result<Json<CallSession>> {
    let mode = parse_mode(&mode)?;
    require_mode(&state, &user_id, mode)?;
    Ok(Json(state.console.calls().stop_call(&user_id).await?))
}

/// Apply a session event from the public page.
pub async fn session_event(
    State(state): State<AppState>,
    Path((user_id, mode)): Path<(String, String)>,
    Json(request): Json<EventRequest>,
) -> Result<Json<CallSession>> {
    let mode = parse_mode(&mode)?;
    require_mode(&state, &user_id, mode)?;
    let session = state.console.calls().handle_event(
        &user_id,
        request.call_id.as_deref(),
        request.event,
    )
    .await?;
    Ok(Json(session))
}

/// A shared page may only touch a call of its own mode.
fn require_mode(state: &AppState, user_id: &str, mode: Mode) -> Result<()> {
    match state.console.calls().session(user_id) {
        Some(session) if session.mode == mode => Ok(()),
        _ => Err(ConsoleError::NoActiveSession.into()),
    }
}
