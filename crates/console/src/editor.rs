//! Conversational prompt editing.
//!
//! Each (user, mode) pair has its own editing session. A user message asks
//! the completion endpoint for a proposal, the proposal is staged, and the
//! user either confirms it (persist and sync) or rejects it.

use std::sync::Arc;

use console_core::template::{missing_placeholders, resolve_prompt};
use console_core::{
    AgentConfig, ChatMessage, CompletionRequest, CompletionService, ConsoleError, Mode,
    ProfileUpdate, ProtectedField,
};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::proposal::{parse_proposal, PendingChange};
use crate::sync::{load_or_new, AgentSync};

/// Sampling temperature for edit proposals.
const PROPOSAL_TEMPERATURE: f32 = 0.1;

/// Token limit for edit proposals.
const PROPOSAL_MAX_TOKENS: u32 = 2000;

/// Where an editing session is in its exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    AwaitingProposal,
    AwaitingConfirmation(PendingChange),
}

impl EditorState {
    fn label(&self) -> &'static str {
        match self {
            EditorState::Idle => "idle",
            EditorState::AwaitingProposal => "awaiting_proposal",
            EditorState::AwaitingConfirmation(_) => "awaiting_confirmation",
        }
    }
}

#[derive(Debug, Default)]
struct EditorSession {
    state: EditorState,
    transcript: Vec<ChatMessage>,
}

impl EditorSession {
    /// Drop the pending change and the transcript together.
    fn reset(&mut self) {
        self.state = EditorState::Idle;
        self.transcript.clear();
    }
}

/// A read-only view of an editing session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSnapshot {
    pub state: &'static str,
    pub pending: Option<PendingChange>,
    pub transcript: Vec<ChatMessage>,
}

/// The assistant's answer to a user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorReply {
    pub reply: String,
    pub pending: PendingChange,
}

/// What confirming a pending change did.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// The change was a configuration request; nothing was written.
    Dismissed,
    /// The prompt was saved but the mode has no LLM configuration to push.
    Saved,
    /// The prompt was saved and pushed.
    Applied(AgentConfig),
}

/// Drives editing sessions for every user.
pub struct PromptEditor {
    completion: Arc<dyn CompletionService>,
    sync: Arc<AgentSync>,
    sessions: Mutex<IndexMap<(String, Mode), Arc<Mutex<EditorSession>>>>,
    max_sessions: usize,
    verify_placeholders: bool,
}

impl PromptEditor {
    /// Create an editor.
    pub fn new(
        completion: Arc<dyn CompletionService>,
        sync: Arc<AgentSync>,
        max_sessions: usize,
        verify_placeholders: bool,
    ) -> Self {
        Self {
            completion,
            sync,
            sessions: Mutex::new(IndexMap::new()),
            max_sessions: max_sessions.max(1),
            verify_placeholders,
        }
    }

    /// Send a user message and stage the resulting proposal.
    ///
    /// A change still awaiting confirmation is discarded first. On failure
    /// the session is left as it was before the message.
    pub async fn send_message(
        &self,
        user_id: &str,
        mode: Mode,
        text: &str,
    ) -> Result<EditorReply, ConsoleError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConsoleError::Validation("message cannot be empty".to_string()));
        }

        let session = self.session(user_id, mode).await;
        {
            let mut guard = session.lock().await;
            match guard.state {
                EditorState::AwaitingProposal => {
                    return Err(ConsoleError::Validation(
                        "a proposal is already being prepared".to_string(),
                    ));
                }
                EditorState::AwaitingConfirmation(_) => {
                    debug!(user_id = %user_id, mode = %mode, "Discarding pending change for new message");
                    guard.reset();
                }
                EditorState::Idle => {}
            }
            guard.state = EditorState::AwaitingProposal;
            guard.transcript.push(ChatMessage::user(text));
        }

        let result = self.propose(user_id, mode, text).await;

        let mut guard = session.lock().await;
        match result {
            Ok(change) => {
                let reply = change.reply_text();
                guard.transcript.push(ChatMessage::assistant(reply.clone()));
                guard.state = EditorState::AwaitingConfirmation(change.clone());
                info!(
                    user_id = %user_id,
                    mode = %mode,
                    configuration_request = change.configuration_request,
                    "Proposal staged"
                );
                Ok(EditorReply {
                    reply,
                    pending: change,
                })
            }
            Err(e) => {
                guard.transcript.pop();
                guard.state = EditorState::Idle;
                warn!(user_id = %user_id, mode = %mode, error = %e, "Proposal failed");
                Err(e)
            }
        }
    }

    /// Apply the pending change.
    ///
    /// If persisting or syncing fails the change stays pending so the user
    /// can retry.
    pub async fn confirm(&self, user_id: &str, mode: Mode) -> Result<ConfirmOutcome, ConsoleError> {
        let session = self.session(user_id, mode).await;
        let mut guard = session.lock().await;

        let change = match &guard.state {
            EditorState::AwaitingConfirmation(change) => change.clone(),
            _ => return Err(ConsoleError::Validation("nothing to confirm".to_string())),
        };

        if change.configuration_request {
            guard.reset();
            info!(user_id = %user_id, mode = %mode, "Configuration request dismissed");
            return Ok(ConfirmOutcome::Dismissed);
        }

        self.sync
            .store()
            .merge(user_id, ProfileUpdate::new().prompt_override(mode, &change.prompt))
            .await?;

        let outcome = match self.sync.sync_agent(user_id, mode).await {
            Ok(config) => ConfirmOutcome::Applied(config),
            Err(ConsoleError::NotProvisioned { .. }) => ConfirmOutcome::Saved,
            Err(e) => {
                warn!(user_id = %user_id, mode = %mode, error = %e, "Sync after edit failed; change kept pending");
                return Err(e);
            }
        };

        guard.reset();
        info!(user_id = %user_id, mode = %mode, "Prompt edit applied");
        Ok(outcome)
    }

    /// Discard the pending change and the transcript.
    pub async fn reject(&self, user_id: &str, mode: Mode) -> Result<(), ConsoleError> {
        let session = self.session(user_id, mode).await;
        let mut guard = session.lock().await;

        if guard.state == EditorState::AwaitingProposal {
            return Err(ConsoleError::Validation(
                "a proposal is still being prepared".to_string(),
            ));
        }

        guard.reset();
        debug!(user_id = %user_id, mode = %mode, "Editing session reset");
        Ok(())
    }

    /// Current state of a user's session.
    pub async fn snapshot(&self, user_id: &str, mode: Mode) -> EditorSnapshot {
        let session = self.session(user_id, mode).await;
        let guard = session.lock().await;

        EditorSnapshot {
            state: guard.state.label(),
            pending: match &guard.state {
                EditorState::AwaitingConfirmation(change) => Some(change.clone()),
                _ => None,
            },
            transcript: guard.transcript.clone(),
        }
    }

    /// Number of sessions currently tracked.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn propose(
        &self,
        user_id: &str,
        mode: Mode,
        text: &str,
    ) -> Result<PendingChange, ConsoleError> {
        let profile = load_or_new(self.sync.store(), user_id).await?;
        let current = resolve_prompt(&profile, mode);

        let request = CompletionRequest::json(vec![
            ChatMessage::system(editor_instruction(&current)),
            ChatMessage::user(text),
        ])
        .with_temperature(PROPOSAL_TEMPERATURE)
        .with_max_tokens(PROPOSAL_MAX_TOKENS);

        let raw = self.completion.complete(request).await?;
        let change = parse_proposal(&raw)?;

        if self.verify_placeholders && !change.configuration_request {
            if let Some(dropped) = missing_placeholders(&current, &change.prompt).first() {
                return Err(ConsoleError::PlaceholderDropped(dropped.token()));
            }
        }

        Ok(change)
    }

    /// Fetch a session, marking it most recently used.
    async fn session(&self, user_id: &str, mode: Mode) -> Arc<Mutex<EditorSession>> {
        let mut sessions = self.sessions.lock().await;
        let key = (user_id.to_string(), mode);

        let session = sessions
            .shift_remove(&key)
            .unwrap_or_else(|| Arc::new(Mutex::new(EditorSession::default())));
        sessions.insert(key, session.clone());

        while sessions.len() > self.max_sessions {
            let Some(index) = evictable(&sessions) else {
                debug!(sessions = sessions.len(), "Editor sessions busy, table over capacity");
                break;
            };
            sessions.shift_remove_index(index);
        }

        session
    }
}

/// Index of the least recently used session that can be dropped.
///
/// Idle sessions go first, then sessions holding an unconfirmed change.
/// Sessions waiting on a proposal or currently locked are never dropped,
/// nor is the most recent entry, which the caller is about to use.
fn evictable(sessions: &IndexMap<(String, Mode), Arc<Mutex<EditorSession>>>) -> Option<usize> {
    let candidates = sessions.len().saturating_sub(1);
    let mut pending = None;

    for (index, session) in sessions.values().take(candidates).enumerate() {
        let Ok(guard) = session.try_lock() else {
            continue;
        };
        match guard.state {
            EditorState::Idle => return Some(index),
            EditorState::AwaitingConfirmation(_) if pending.is_none() => pending = Some(index),
            _ => {}
        }
    }

    pending
}

fn editor_instruction(current: &str) -> String {
    format!(
        "You help a restaurant owner edit the system prompt of their phone agent.\n\n\
         Current prompt:\n\"\"\"\n{current}\n\"\"\"\n\n\
         Tokens written as {{{{name}}}} are filled in from the owner's settings. Keep them \
         unless the owner explicitly asks to remove the information they stand for.\n\n\
         You must not change the {protected}. Those values are managed on the settings page. \
         If the owner asks to change any of them, leave the prompt alone and reply with:\n\
         {{\"prompt\": \"\", \"summary\": \"<tell the owner to update it on the settings page>\", \"configurationRequest\": true}}\n\n\
         Otherwise rewrite the prompt as requested and reply with:\n\
         {{\"prompt\": \"<the complete updated prompt>\", \"summary\": \"<a short description of what changed>\"}}\n\n\
         Reply with the JSON object only.",
        current = current,
        protected = ProtectedField::describe_all(),
    )
}
