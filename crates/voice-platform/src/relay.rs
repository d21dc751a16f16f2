//! Call transport for browser-owned media sessions.
//!
//! The browser opens the real-time audio connection itself using the web
//! call's access token and reports lifecycle events back over HTTP. This
//! transport only tracks which calls are currently handed out; a call is
//! released when it is stopped or the browser reports its end.

use std::collections::HashSet;
use std::sync::Arc;

use console_core::{async_trait, CallTransport, ConsoleError, WebCall};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A [`CallTransport`] that delegates media to the browser.
#[derive(Debug, Clone, Default)]
pub struct RelayTransport {
    calls: Arc<RwLock<HashSet<String>>>,
}

impl RelayTransport {
    /// Create an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls handed to the browser and not yet released.
    pub async fn len(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Whether no calls are handed out.
    pub async fn is_empty(&self) -> bool {
        self.calls.read().await.is_empty()
    }
}

#[async_trait]
impl CallTransport for RelayTransport {
    async fn start(&self, call: &WebCall) -> Result<(), ConsoleError> {
        if call.access_token.is_empty() {
            return Err(ConsoleError::Validation(format!(
                "call {} has no access token",
                call.call_id
            )));
        }

        self.calls.write().await.insert(call.call_id.clone());
        info!(call_id = %call.call_id, "Handed call to browser");
        Ok(())
    }

    async fn stop(&self, call_id: &str) -> Result<(), ConsoleError> {
        if self.calls.write().await.remove(call_id) {
            info!(call_id, "Released relayed call");
        } else {
            debug!(call_id, "Stop for unknown call ignored");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RelayTransport"
    }
}
