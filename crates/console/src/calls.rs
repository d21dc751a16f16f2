//! Live call sessions and post-call analytics retrieval.
//!
//! Each user has at most one call session. When a session becomes inactive
//! the platform is polled in the background for the finished call's record,
//! which is then stored under `analytics[mode][call_id]`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use console_core::{
    CallRecord, CallStatus, CallTransport, ConsoleError, Mode, ProfileStore, ProfileUpdate,
    SessionEvent, VoicePlatform,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How the platform is polled for a finished call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(5),
        }
    }
}

/// What a client needs to join a started call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHandle {
    pub user_id: String,
    pub mode: Mode,
    pub call_id: String,
    pub access_token: String,
}

/// One line of the live transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
}

/// A user's current or most recent call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSession {
    pub mode: Mode,
    pub call_id: String,
    pub status: CallStatus,
    /// Milliseconds since the Unix epoch.
    pub started_at: i64,
    pub transcript: Vec<TranscriptLine>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct SessionTable {
    sessions: HashMap<String, CallSession>,
    starting: HashSet<String>,
}

struct PollTask {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct PollTable {
    running: HashMap<String, PollTask>,
}

/// Owns call sessions and their analytics polls.
pub struct CallSessionManager {
    platform: Arc<dyn VoicePlatform>,
    transport: Arc<dyn CallTransport>,
    store: Arc<dyn ProfileStore>,
    table: Mutex<SessionTable>,
    polls: Arc<Mutex<PollTable>>,
    policy: PollPolicy,
}

impl CallSessionManager {
    /// Create a manager.
    pub fn new(
        platform: Arc<dyn VoicePlatform>,
        transport: Arc<dyn CallTransport>,
        store: Arc<dyn ProfileStore>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            platform,
            transport,
            store,
            table: Mutex::new(SessionTable::default()),
            polls: Arc::new(Mutex::new(PollTable::default())),
            policy,
        }
    }

    /// Start a call with the mode's voice agent.
    ///
    /// A previous inactive session is replaced only once the new call is
    /// up.
    pub async fn start_call(&self, user_id: &str, mode: Mode) -> Result<SessionHandle, ConsoleError> {
        let profile = self.store.get(user_id).await?;
        let agent_id = profile
            .mode(mode)
            .agent
            .as_ref()
            .map(|agent| agent.agent_id.clone())
            .ok_or(ConsoleError::NotProvisioned {
                mode,
                what: "voice agent",
            })?;

        {
            let mut table = lock(&self.table);
            if let Some(session) = table.sessions.get(user_id) {
                if session.status == CallStatus::Active {
                    return Err(ConsoleError::SessionActive {
                        call_id: session.call_id.clone(),
                    });
                }
            }
            if !table.starting.insert(user_id.to_string()) {
                return Err(ConsoleError::SessionActive {
                    call_id: "starting".to_string(),
                });
            }
        }

        let result = self.open(&agent_id).await;

        let mut table = lock(&self.table);
        table.starting.remove(user_id);
        let web_call = result?;

        table.sessions.insert(
            user_id.to_string(),
            CallSession {
                mode,
                call_id: web_call.call_id.clone(),
                status: CallStatus::Active,
                started_at: Utc::now().timestamp_millis(),
                transcript: Vec::new(),
                last_error: None,
            },
        );
        info!(user_id = %user_id, mode = %mode, call_id = %web_call.call_id, "Call started");

        Ok(SessionHandle {
            user_id: user_id.to_string(),
            mode,
            call_id: web_call.call_id,
            access_token: web_call.access_token,
        })
    }

    async fn open(&self, agent_id: &str) -> Result<console_core::WebCall, ConsoleError> {
        let web_call = self.platform.create_web_call(agent_id).await?;
        self.transport.start(&web_call).await?;
        Ok(web_call)
    }

    /// Stop the user's active call and schedule analytics retrieval.
    ///
    /// A transport failure is logged; the session becomes inactive
    /// regardless.
    pub async fn stop_call(&self, user_id: &str) -> Result<CallSession, ConsoleError> {
        let call_id = {
            let table = lock(&self.table);
            match table.sessions.get(user_id) {
                Some(session) if session.status == CallStatus::Active => session.call_id.clone(),
                _ => return Err(ConsoleError::NoActiveSession),
            }
        };

        if let Err(e) = self.transport.stop(&call_id).await {
            warn!(user_id = %user_id, call_id = %call_id, error = %e, "Transport stop failed");
        }

        self.deactivate(user_id, &call_id, None)
            .ok_or(ConsoleError::NoActiveSession)
    }

    /// Apply a lifecycle event relayed from the media session.
    ///
    /// Events naming a call other than the session's current one are
    /// ignored, as is `Started` for a call that already ended. When the
    /// browser reports the end of an active call the transport is released.
    pub async fn handle_event(
        &self,
        user_id: &str,
        call_id: Option<&str>,
        event: SessionEvent,
    ) -> Result<CallSession, ConsoleError> {
        let (current, was_active) = {
            let mut table = lock(&self.table);
            let session = table
                .sessions
                .get_mut(user_id)
                .ok_or(ConsoleError::NoActiveSession)?;

            if let Some(call_id) = call_id {
                if call_id != session.call_id {
                    debug!(user_id = %user_id, call_id = %call_id, "Ignoring event for a previous call");
                    return Ok(session.clone());
                }
            }

            match &event {
                SessionEvent::Started => {
                    if session.status == CallStatus::Inactive {
                        debug!(user_id = %user_id, call_id = %session.call_id, "Ignoring start of an ended call");
                    } else {
                        session.status = CallStatus::Active;
                    }
                    return Ok(session.clone());
                }
                SessionEvent::TranscriptUpdate { speaker, text } => {
                    session.transcript.push(TranscriptLine {
                        speaker: speaker.clone(),
                        text: text.clone(),
                    });
                    return Ok(session.clone());
                }
                SessionEvent::Ended { code, reason } => {
                    info!(user_id = %user_id, call_id = %session.call_id, ?code, ?reason, "Call ended");
                }
                SessionEvent::Error { message } => {
                    warn!(user_id = %user_id, call_id = %session.call_id, error = %message, "Call error");
                }
            }
            (session.call_id.clone(), session.status == CallStatus::Active)
        };

        if was_active {
            if let Err(e) = self.transport.stop(&current).await {
                warn!(user_id = %user_id, call_id = %current, error = %e, "Transport release failed");
            }
        }

        let error = match event {
            SessionEvent::Error { message } => Some(message),
            _ => None,
        };
        self.deactivate(user_id, &current, error)
            .ok_or(ConsoleError::NoActiveSession)
    }

    /// The user's current or most recent session.
    pub fn session(&self, user_id: &str) -> Option<CallSession> {
        lock(&self.table).sessions.get(user_id).cloned()
    }

    /// Status of the user's session.
    pub fn status(&self, user_id: &str) -> CallStatus {
        self.session(user_id)
            .map(|session| session.status)
            .unwrap_or_default()
    }

    fn deactivate(&self, user_id: &str, call_id: &str, error: Option<String>) -> Option<CallSession> {
        let session = {
            let mut table = lock(&self.table);
            let session = table.sessions.get_mut(user_id)?;
            if session.call_id != call_id {
                return Some(session.clone());
            }
            if error.is_some() {
                session.last_error = error;
            }
            if session.status == CallStatus::Inactive {
                return Some(session.clone());
            }
            session.status = CallStatus::Inactive;
            session.clone()
        };

        info!(user_id = %user_id, call_id = %call_id, "Call inactive");
        self.schedule_analytics(user_id, session.mode, call_id, session.started_at);
        Some(session)
    }

    /// Start the analytics poll for a call. Returns `false` if one is
    /// already running for this call id.
    ///
    /// Sessions schedule once, on their transition into inactive. A record
    /// that is already stored is never overwritten, so a later poll for the
    /// same call cannot replace it.
    pub fn schedule_analytics(&self, user_id: &str, mode: Mode, call_id: &str, started_at: i64) -> bool {
        let mut polls = lock(&self.polls);
        if polls.running.contains_key(call_id) {
            debug!(call_id = %call_id, "Analytics already scheduled");
            return false;
        }

        let token = CancellationToken::new();
        let task = AnalyticsTask {
            platform: self.platform.clone(),
            store: self.store.clone(),
            polls: self.polls.clone(),
            policy: self.policy,
            user_id: user_id.to_string(),
            mode,
            call_id: call_id.to_string(),
            started_at,
            token: token.clone(),
        };

        // The task removes its own entry, which needs this lock, so it
        // cannot finish before the entry exists.
        let handle = tokio::spawn(task.run());
        polls.running.insert(
            call_id.to_string(),
            PollTask {
                token,
                handle: Some(handle),
            },
        );
        debug!(call_id = %call_id, "Analytics scheduled");
        true
    }

    /// Cancel a pending analytics poll.
    pub fn cancel_analytics(&self, call_id: &str) -> bool {
        match lock(&self.polls).running.get(call_id) {
            Some(task) => {
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of analytics polls still running.
    pub fn pending_analytics(&self) -> usize {
        lock(&self.polls).running.len()
    }

    /// Wait for a call's analytics poll to finish.
    pub async fn wait_for_analytics(&self, call_id: &str) {
        let handle = lock(&self.polls)
            .running
            .get_mut(call_id)
            .and_then(|task| task.handle.take());

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(call_id = %call_id, error = %e, "Analytics task panicked");
            }
        }
    }

    /// Cancel every pending poll and wait for them to stop.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut polls = lock(&self.polls);
            polls
                .running
                .values_mut()
                .filter_map(|task| {
                    task.token.cancel();
                    task.handle.take()
                })
                .collect()
        };

        info!(count = handles.len(), "Cancelling analytics polls");
        for handle in handles {
            let _ = handle.await;
        }
    }
}

struct AnalyticsTask {
    platform: Arc<dyn VoicePlatform>,
    store: Arc<dyn ProfileStore>,
    polls: Arc<Mutex<PollTable>>,
    policy: PollPolicy,
    user_id: String,
    mode: Mode,
    call_id: String,
    started_at: i64,
    token: CancellationToken,
}

impl AnalyticsTask {
    async fn run(self) {
        let result =
            fetch_analytics(self.platform.as_ref(), &self.call_id, self.policy, &self.token).await;

        match result {
            Ok(mut record) => {
                if record.start_timestamp.is_none() {
                    record.start_timestamp = Some(self.started_at);
                }
                if let Err(e) = store_call_record(self.store.as_ref(), &self.user_id, self.mode, record).await {
                    warn!(user_id = %self.user_id, call_id = %self.call_id, error = %e, "Failed to store call analytics");
                }
            }
            Err(ConsoleError::Cancelled) => {
                info!(call_id = %self.call_id, "Analytics poll cancelled");
            }
            Err(e) => {
                warn!(user_id = %self.user_id, call_id = %self.call_id, error = %e, "Call analytics unavailable");
            }
        }

        lock(&self.polls).running.remove(&self.call_id);
    }
}

/// Poll the platform until the call's record is available.
///
/// Sleeps before every attempt. Transient errors count as empty attempts.
pub async fn fetch_analytics(
    platform: &dyn VoicePlatform,
    call_id: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<CallRecord, ConsoleError> {
    for attempt in 1..=policy.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ConsoleError::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }

        match platform.get_call(call_id).await {
            Ok(Some(record)) => {
                info!(call_id = %call_id, attempt, "Call analytics retrieved");
                return Ok(record);
            }
            Ok(None) => debug!(call_id = %call_id, attempt, "Call analytics not ready"),
            Err(e) => warn!(call_id = %call_id, attempt, error = %e, "Call retrieval failed"),
        }
    }

    Err(ConsoleError::AnalyticsUnavailable {
        call_id: call_id.to_string(),
        attempts: policy.max_attempts,
    })
}

/// Store a call record under `analytics[mode][call_id]` unless one is
/// already there. Returns whether it was written.
pub async fn store_call_record(
    store: &dyn ProfileStore,
    user_id: &str,
    mode: Mode,
    record: CallRecord,
) -> Result<bool, ConsoleError> {
    match store.get(user_id).await {
        Ok(profile) if profile.calls(mode).contains_key(&record.call_id) => {
            debug!(user_id = %user_id, call_id = %record.call_id, "Call record already stored");
            return Ok(false);
        }
        Ok(_) | Err(ConsoleError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    store
        .merge(user_id, ProfileUpdate::new().call_record(mode, &record)?)
        .await?;
    info!(user_id = %user_id, mode = %mode, call_id = %record.call_id, "Call analytics stored");
    Ok(true)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
