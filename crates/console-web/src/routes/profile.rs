//! Profile, settings and provisioning endpoints.

use axum::extract::{Path, State};
use axum::Json;
use console::{BotSettingsUpdate, PromptView, RestaurantInfoUpdate};
use console_core::{AgentConfig, Mode, ModeSettings, RestaurantInfo, UserProfile, VoiceAgent};
use serde::Serialize;

use super::parse_mode;
use crate::auth::UserId;
use crate::error::Result;
use crate::state::AppState;

/// The caller's whole profile.
pub async fn get_profile(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.console.profile(&user_id).await?))
}

/// Sync result for one mode after a restaurant edit.
#[derive(Serialize)]
pub struct ModeSyncResult {
    pub mode: Mode,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct RestaurantResponse {
    pub restaurant: RestaurantInfo,
    pub synced: Vec<ModeSyncResult>,
}

/// Change restaurant facts and resync provisioned modes.
pub async fn update_restaurant(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(changes): Json<RestaurantInfoUpdate>,
) -> Result<Json<RestaurantResponse>> {
    let outcome = state
        .console
        .settings()
        .update_restaurant_info(&user_id, changes)
        .await?;

    let synced = outcome
        .synced
        .into_iter()
        .map(|(mode, result)| ModeSyncResult {
            mode,
            ok: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        })
        .collect();

    Ok(Json(RestaurantResponse {
        restaurant: outcome.restaurant,
        synced,
    }))
}

/// A mode's settings.
pub async fn get_settings(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<ModeSettings>> {
    let mode = parse_mode(&mode)?;
    let profile = state.console.profile(&user_id).await?;
    Ok(Json(profile.mode(mode).clone()))
}

/// Change a mode's bot settings.
pub async fn update_settings(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
    Json(changes): Json<BotSettingsUpdate>,
) -> Result<Json<ModeSettings>> {
    let mode = parse_mode(&mode)?;
    let settings = state
        .console
        .settings()
        .update_bot_settings(&user_id, mode, changes)
        .await?;
    Ok(Json(settings))
}

/// The prompt in effect for a mode.
pub async fn get_prompt(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<PromptView>> {
    let mode = parse_mode(&mode)?;
    let profile = state.console.profile(&user_id).await?;
    Ok(Json(PromptView::of(&profile, mode)))
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub prompt: PromptView,
    pub applied: Option<AgentConfig>,
}

/// Drop the prompt override and push the default.
pub async fn reset_prompt(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<ResetResponse>> {
    let mode = parse_mode(&mode)?;
    let applied = state.console.settings().reset_prompt(&user_id, mode).await?;
    let profile = state.console.profile(&user_id).await?;
    Ok(Json(ResetResponse {
        prompt: PromptView::of(&profile, mode),
        applied,
    }))
}

/// Push the mode's effective configuration.
pub async fn sync_mode(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<AgentConfig>> {
    let mode = parse_mode(&mode)?;
    Ok(Json(state.console.sync().sync_agent(&user_id, mode).await?))
}

/// Create the mode's LLM configuration and voice agent.
pub async fn provision_mode(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mode): Path<String>,
) -> Result<Json<VoiceAgent>> {
    let mode = parse_mode(&mode)?;
    let agent = state
        .console
        .provisioner()
        .provision_mode(&user_id, mode)
        .await?;
    Ok(Json(agent))
}
