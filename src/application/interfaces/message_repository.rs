use async_trait::async_trait;

use crate::domain::{ChatMessage, DomainError, NewMessage};

use super::MessageSubscription;

/// The ordered `.../cases/{caseId}/messages` collection.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a message; the store assigns id, timestamp and sequence.
    async fn append_message(
        &self,
        uid: &str,
        case_id: &str,
        message: NewMessage,
    ) -> Result<ChatMessage, DomainError>;

    /// All messages of a case in chronological order.
    async fn list_messages(&self, uid: &str, case_id: &str)
        -> Result<Vec<ChatMessage>, DomainError>;

    /// Opens a live, chronologically ordered view of the case's messages.
    async fn subscribe(&self, uid: &str, case_id: &str)
        -> Result<MessageSubscription, DomainError>;
}
