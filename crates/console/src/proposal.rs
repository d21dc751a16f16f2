//! Parsing the completion endpoint's edit proposals.

use console_core::ConsoleError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A staged, unconfirmed prompt edit.
///
/// A configuration request never carries prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    pub prompt: String,
    pub summary: String,
    pub configuration_request: bool,
}

impl PendingChange {
    /// The assistant turn shown to the user for this proposal.
    pub fn reply_text(&self) -> String {
        if self.configuration_request {
            self.summary.clone()
        } else {
            format!(
                "Here's what I understand you want to change:\n\n{}\n\nWould you like me to apply these changes?",
                self.summary
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawProposal {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, rename = "configurationRequest")]
    configuration_request: Option<bool>,
}

/// Parse a completion into a [`PendingChange`].
///
/// The text is parsed directly first. If that fails, the first balanced
/// JSON object found in it is parsed instead.
pub fn parse_proposal(raw: &str) -> Result<PendingChange, ConsoleError> {
    let parsed: RawProposal = match serde_json::from_str(raw.trim()) {
        Ok(parsed) => parsed,
        Err(_) => serde_json::from_str(extract_json(raw)).map_err(|e| {
            ConsoleError::MalformedResponse(format!("no proposal object in completion: {}", e))
        })?,
    };

    let summary = parsed
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConsoleError::MalformedResponse("proposal has no summary".to_string()))?;

    if parsed.configuration_request.unwrap_or(false) {
        if parsed.prompt.as_deref().is_some_and(|p| !p.trim().is_empty()) {
            warn!("Configuration request carried prompt text; dropping it");
        }
        return Ok(PendingChange {
            prompt: String::new(),
            summary,
            configuration_request: true,
        });
    }

    let prompt = parsed
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ConsoleError::MalformedResponse("proposal has no prompt".to_string()))?;

    Ok(PendingChange {
        prompt,
        summary,
        configuration_request: false,
    })
}

/// Locate the JSON object inside a completion that wrapped it in prose or
/// a code fence.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if trimmed.starts_with('{') {
        return extract_balanced_json(trimmed);
    }

    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return extract_balanced_json(trimmed[json_start..json_start + end].trim());
        }
    }

    if let Some(start) = trimmed.find('{') {
        return extract_balanced_json(&trimmed[start..]);
    }

    trimmed
}

/// The shortest prefix of `s` that is a brace-balanced object, ignoring
/// braces inside string literals.
fn extract_balanced_json(s: &str) -> &str {
    if !s.starts_with('{') {
        return s;
    }

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return &s[..=i];
                }
            }
            _ => {}
        }
    }

    s
}
