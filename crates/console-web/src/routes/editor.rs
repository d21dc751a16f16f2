//! Conversational prompt editor endpoints.

use axum::extract::{Path, State};
use axum::Json;
use console::{ConfirmOutcome, EditorReply, EditorSnapshot};
use console_core::AgentConfig;
use serde::{Deserialize, Serialize};

use super::parse_mode;
use crate::auth::UserId;
use crate::error::{Result, WebError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Send a message to the editor and get its proposal.
pub async fn send_message(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<EditorReply>> {
    let mode = parse_mode(&mode)?;
    if request.message.trim().is_empty() {
        return Err(WebError::BadRequest("message must not be empty".to_string()));
    }

    let reply = state
        .console
        .editor()
        .send_message(&user_id, mode, &request.message)
        .await?;
    Ok(Json(reply))
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    /// `dismissed`, `saved` or `applied`.
    pub outcome: &'static str,
    pub applied: Option<AgentConfig>,
}

/// Apply the pending change.
pub async fn confirm(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<ConfirmResponse>> {
    let mode = parse_mode(&mode)?;
    let response = match state.console.editor().confirm(&user_id, mode).await? {
        ConfirmOutcome::Dismissed => ConfirmResponse {
            outcome: "dismissed",
            applied: None,
        },
        ConfirmOutcome::Saved => ConfirmResponse {
            outcome: "saved",
            applied: None,
        },
        ConfirmOutcome::Applied(config) => ConfirmResponse {
            outcome: "applied",
            applied: Some(config),
        },
    };
    Ok(Json(response))
}

/// Discard the pending change.
pub async fn reject(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<EditorSnapshot>> {
    let mode = parse_mode(&mode)?;
    state.console.editor().reject(&user_id, mode).await?;
    Ok(Json(state.console.editor().snapshot(&user_id, mode).await))
}

/// Current editor session.
pub async fn snapshot(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<EditorSnapshot>> {
    let mode = parse_mode(&mode)?;
    Ok(Json(state.console.editor().snapshot(&user_id, mode).await))
}
