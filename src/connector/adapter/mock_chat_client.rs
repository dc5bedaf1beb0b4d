use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::application::ChatClient;
use crate::domain::DomainError;

/// Offline [`ChatClient`] with a canned, input-dependent answer.
pub struct MockChatClient {
    fail: bool,
    calls: AtomicUsize,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A client whose every call fails like an unreachable upstream.
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::upstream("MockChatClient: simulated outage"));
        }

        debug!("MockChatClient answering {} chars", user.len());
        Ok(format!(
            "You mentioned: \"{}\". Rest, stay hydrated, and see a doctor if it gets worse.",
            user.trim()
        ))
    }
}
