//! Recording call transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use console_core::{async_trait, CallTransport, ConsoleError, WebCall};

use crate::completion::lock;

/// A transport that records start/stop requests.
#[derive(Default)]
pub struct MockTransport {
    started: Mutex<Vec<String>>,
    stopped: Mutex<Vec<String>>,
    fail_start: AtomicBool,
}

impl MockTransport {
    /// Create a transport that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent starts fail.
    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Call ids started so far.
    pub fn started(&self) -> Vec<String> {
        lock(&self.started).clone()
    }

    /// Call ids stopped so far.
    pub fn stopped(&self) -> Vec<String> {
        lock(&self.stopped).clone()
    }
}

#[async_trait]
impl CallTransport for MockTransport {
    async fn start(&self, call: &WebCall) -> Result<(), ConsoleError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(ConsoleError::Network("media session refused".to_string()));
        }
        lock(&self.started).push(call.call_id.clone());
        Ok(())
    }

    async fn stop(&self, call_id: &str) -> Result<(), ConsoleError> {
        lock(&self.stopped).push(call_id.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "MockTransport"
    }
}
