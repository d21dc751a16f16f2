//! Rewriting a mode's prompt from recorded call transcripts.

use std::sync::Arc;

use console_core::template::{missing_placeholders, resolve_prompt};
use console_core::{
    AgentConfig, ChatMessage, CompletionRequest, CompletionService, ConsoleError, Mode,
    ProfileUpdate,
};
use serde::Serialize;
use tracing::info;

use crate::sync::AgentSync;

/// Most calls that can feed one improvement.
pub const MAX_CALLS_PER_IMPROVEMENT: usize = 5;

/// Result of an improvement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovedPrompt {
    pub prompt: String,
    /// The applied configuration, when the mode is provisioned.
    pub applied: Option<AgentConfig>,
}

#[derive(Serialize)]
struct CallSample<'a> {
    transcript: Option<&'a str>,
    sentiment: Option<&'a str>,
    summary: Option<&'a str>,
}

/// Asks the completion endpoint for a better prompt based on real calls.
pub struct PromptImprover {
    completion: Arc<dyn CompletionService>,
    sync: Arc<AgentSync>,
    verify_placeholders: bool,
}

impl PromptImprover {
    /// Create an improver.
    pub fn new(
        completion: Arc<dyn CompletionService>,
        sync: Arc<AgentSync>,
        verify_placeholders: bool,
    ) -> Self {
        Self {
            completion,
            sync,
            verify_placeholders,
        }
    }

    /// Rewrite the mode's prompt using up to five of its recorded calls,
    /// store it as the override and push it.
    pub async fn improve_from_transcripts(
        &self,
        user_id: &str,
        mode: Mode,
        call_ids: &[String],
    ) -> Result<ImprovedPrompt, ConsoleError> {
        let mut selected: Vec<&str> = Vec::new();
        for id in call_ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        if selected.is_empty() || selected.len() > MAX_CALLS_PER_IMPROVEMENT {
            return Err(ConsoleError::Validation(format!(
                "select between 1 and {} calls",
                MAX_CALLS_PER_IMPROVEMENT
            )));
        }

        let profile = self.sync.store().get(user_id).await?;
        let calls = profile.calls(mode);
        let samples = selected
            .iter()
            .map(|id| {
                calls
                    .get(*id)
                    .map(|record| CallSample {
                        transcript: record.transcript.as_deref(),
                        sentiment: record.sentiment(),
                        summary: record.summary(),
                    })
                    .ok_or_else(|| ConsoleError::NotFound {
                        entity: "call",
                        id: id.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let current = resolve_prompt(&profile, mode);
        let samples_json = serde_json::to_string_pretty(&samples)
            .map_err(|e| ConsoleError::Validation(format!("failed to encode calls: {}", e)))?;

        let request = CompletionRequest::text(vec![ChatMessage::system(improvement_instruction(
            &current,
            &samples_json,
        ))])
        .with_temperature(0.1)
        .with_max_tokens(2000);

        let raw = self.completion.complete(request).await?;
        let prompt = raw.trim().to_string();
        if prompt.is_empty() {
            return Err(ConsoleError::MalformedResponse(
                "completion returned an empty prompt".to_string(),
            ));
        }

        if self.verify_placeholders {
            if let Some(dropped) = missing_placeholders(&current, &prompt).first() {
                return Err(ConsoleError::PlaceholderDropped(dropped.token()));
            }
        }

        self.sync
            .store()
            .merge(user_id, ProfileUpdate::new().prompt_override(mode, &prompt))
            .await?;
        info!(user_id = %user_id, mode = %mode, calls = selected.len(), "Prompt improved from transcripts");

        let applied = match self.sync.sync_agent(user_id, mode).await {
            Ok(config) => Some(config),
            Err(ConsoleError::NotProvisioned { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(ImprovedPrompt { prompt, applied })
    }
}

fn improvement_instruction(current: &str, samples_json: &str) -> String {
    format!(
        "You improve the system prompt of a restaurant's phone agent using recordings of real calls.\n\n\
         Current prompt:\n\"\"\"\n{current}\n\"\"\"\n\n\
         Calls, with the platform's sentiment and summary for each:\n{samples}\n\n\
         Look for where the agent misunderstood callers, missed information or sounded off, \
         and rewrite the prompt to fix it. Keep every {{{{name}}}} token. \
         Reply with the complete improved prompt only, with no explanation.",
        current = current,
        samples = samples_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{provisioned_profile, services};
    use console_core::{CallAnalysis, CallRecord};
    use mock_services::ScriptedCompletion;

    fn with_calls() -> console_core::UserProfile {
        let mut profile = provisioned_profile("owner-1");
        for (id, sentiment) in [("call_a", "Negative"), ("call_b", "Positive")] {
            profile.analytics.customer.insert(
                id.to_string(),
                CallRecord {
                    call_id: id.to_string(),
                    transcript: Some(format!("transcript of {}", id)),
                    call_analysis: Some(CallAnalysis {
                        user_sentiment: Some(sentiment.to_string()),
                        call_summary: Some("Asked about parking".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            );
        }
        profile
    }

    #[tokio::test]
    async fn test_improve_persists_and_syncs() {
        let (store, platform) = services();
        store.insert_profile(&with_calls()).unwrap();
        let completion = Arc::new(ScriptedCompletion::with_replies(vec![
            "  You are {{botName}} at {{restaurantName}}. Mention street parking.  ",
        ]));
        let improver = PromptImprover::new(
            completion.clone(),
            Arc::new(AgentSync::new(store.clone(), platform.clone())),
            false,
        );

        let improved = improver
            .improve_from_transcripts(
                "owner-1",
                Mode::Customer,
                &["call_a".to_string(), "call_b".to_string(), "call_a".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(improved.prompt, "You are {{botName}} at {{restaurantName}}. Mention street parking.");
        assert!(improved.applied.is_some());
        assert_eq!(platform.updates()[0].1.general_prompt, "You are Mia at Luigi's. Mention street parking.");

        let request = &completion.requests()[0];
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[0].content.contains("transcript of call_b"));
        assert!(request.messages[0].content.contains("\"sentiment\": \"Negative\""));
    }

    #[tokio::test]
    async fn test_improve_rejects_bad_selection() {
        let (store, platform) = services();
        store.insert_profile(&with_calls()).unwrap();
        let completion = Arc::new(ScriptedCompletion::new());
        let improver = PromptImprover::new(
            completion.clone(),
            Arc::new(AgentSync::new(store, platform)),
            false,
        );

        assert!(matches!(
            improver.improve_from_transcripts("owner-1", Mode::Customer, &[]).await,
            Err(ConsoleError::Validation(_))
        ));
        let six: Vec<String> = (0..6).map(|i| format!("call_{}", i)).collect();
        assert!(matches!(
            improver.improve_from_transcripts("owner-1", Mode::Customer, &six).await,
            Err(ConsoleError::Validation(_))
        ));
        assert!(matches!(
            improver
                .improve_from_transcripts("owner-1", Mode::Customer, &["call_zzz".to_string()])
                .await,
            Err(ConsoleError::NotFound { entity: "call", .. })
        ));
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_completion_is_malformed() {
        let (store, platform) = services();
        store.insert_profile(&with_calls()).unwrap();
        let improver = PromptImprover::new(
            Arc::new(ScriptedCompletion::with_replies(vec!["   "])),
            Arc::new(AgentSync::new(store.clone(), platform)),
            false,
        );

        assert!(matches!(
            improver
                .improve_from_transcripts("owner-1", Mode::Customer, &["call_a".to_string()])
                .await,
            Err(ConsoleError::MalformedResponse(_))
        ));
        assert_eq!(store.writes(), 0);
    }
}
