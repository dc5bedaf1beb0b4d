use async_trait::async_trait;

use crate::domain::DomainError;

/// An interface for sending chat-style prompts to an LLM and receiving text responses.
///
/// Implementors own the vendor-specific wire format
/// and the relay pipeline only ever sees the completion text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a `system` instruction followed by a `user` prompt and return
    /// the first completion's text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError>;
}
