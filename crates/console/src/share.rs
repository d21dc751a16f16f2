//! Public links to a mode's calling page.

use console_core::{ConsoleError, Mode, UserProfile};
use serde::Serialize;

/// Direct link and iframe snippet for a shared calling page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub embed_code: String,
}

/// Build the share links for a user's mode.
pub fn share_links(base_url: &str, user_id: &str, mode: Mode) -> ShareLinks {
    let url = format!(
        "{}/shared/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(user_id),
        mode
    );
    let embed_code = format!(
        r#"<iframe src="{}?embed=true" width="100%" height="600" frameborder="0" allow="microphone"></iframe>"#,
        url
    );
    ShareLinks { url, embed_code }
}

/// What the public page shows for a shared mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedSession {
    pub restaurant_name: Option<String>,
    pub mode: Mode,
    pub bot_name: Option<String>,
    pub agent_id: String,
}

/// The public view of a mode. Only provisioned modes can be shared.
pub fn shared_session(profile: &UserProfile, mode: Mode) -> Result<SharedSession, ConsoleError> {
    let settings = profile.mode(mode);
    let agent = settings.agent.as_ref().ok_or(ConsoleError::NotProvisioned {
        mode,
        what: "voice agent",
    })?;

    Ok(SharedSession {
        restaurant_name: profile.restaurant.name.clone(),
        mode,
        bot_name: settings.bot_name.clone(),
        agent_id: agent.agent_id.clone(),
    })
}
