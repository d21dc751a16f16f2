//! Call session endpoints for the owner's test calls.

use axum::extract::{Path, State};
use axum::Json;
use console::{CallSession, SessionHandle};
use console_core::{CallStatus, SessionEvent};
use serde::{Deserialize, Serialize};

use super::parse_mode;
use crate::auth::UserId;
use crate::error::Result;
use crate::state::AppState;

/// A lifecycle event relayed by the calling page.
#[derive(Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub call_id: Option<String>,
    pub event: SessionEvent,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: CallStatus,
    pub session: Option<CallSession>,
}

/// Start a call with the mode's agent.
pub async fn start_call(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<SessionHandle>> {
    let mode = parse_mode(&mode)?;
    Ok(Json(state.console.calls().start_call(&user_id, mode).await?))
}

/// Stop the caller's active call.
pub async fn stop_call(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<CallSession>> {
    Ok(Json(state.console.calls().stop_call(&user_id).await?))
}

/// Apply a session event.
pub async fn session_event(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<EventRequest>,
) -> Result<Json<CallSession>> {
    let session = state.console.calls().handle_event(
        &user_id,
        request.call_id.as_deref(),
        request.event,
    )
    .await?;
    Ok(Json(session))
}

/// The caller's current or most recent call.
pub async fn status(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Json<StatusResponse> {
    let session = state.console.calls().session(&user_id);
    Json(StatusResponse {
        status: session.as_ref().map(|s| s.status).unwrap_or_default(),
        session,
    })
}
