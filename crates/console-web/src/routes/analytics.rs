//! Call analytics endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use console::{list_calls, CallFilter, ImprovedPrompt};
use console_core::CallRecord;
use serde::Deserialize;

use super::parse_mode;
use crate::auth::UserId;
use crate::error::Result;
use crate::state::AppState;

/// Stored calls for a mode, newest first.
pub async fn list(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
    Query(filter): Query<CallFilter>,
) -> Result<Json<Vec<CallRecord>>> {
    let mode = parse_mode(&mode)?;
    let profile = state.console.profile(&user_id).await?;
    let calls = list_calls(&profile, mode, &filter)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(calls))
}

#[derive(Deserialize)]
pub struct ImproveRequest {
    pub call_ids: Vec<String>,
}

/// Rewrite the mode's prompt from selected calls.
pub async fn improve(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImprovedPrompt>> {
    let mode = parse_mode(&mode)?;
    let improved = state
        .console
        .improver()
        .improve_from_transcripts(&user_id, mode, &request.call_ids)
        .await?;
    Ok(Json(improved))
}
