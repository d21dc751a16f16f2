//! Scripted completion service.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use console_core::{async_trait, CompletionRequest, CompletionService, ConsoleError};

/// A completion service that replays queued replies in order.
///
/// Every request is recorded. When the queue runs dry the call fails with
/// [`ConsoleError::Completion`].
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, ConsoleError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedCompletion {
    /// Create a service with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that replies with each string in turn.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let service = Self::new();
        for reply in replies {
            service.push_reply(reply);
        }
        service
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(Ok(reply.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ConsoleError) {
        lock(&self.replies).push_back(Err(error));
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ConsoleError> {
        lock(&self.requests).push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(ConsoleError::Completion("no scripted reply left".to_string())))
    }

    fn name(&self) -> &str {
        "ScriptedCompletion"
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
