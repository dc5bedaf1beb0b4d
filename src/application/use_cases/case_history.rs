use std::sync::Arc;

use crate::application::{CaseRepository, MessageRepository};
use crate::domain::{Case, ChatMessage, DomainError, Identity};

/// A case together with its ordered messages.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub case: Case,
    pub messages: Vec<ChatMessage>,
}

pub struct CaseHistoryUseCase {
    case_repo: Arc<dyn CaseRepository>,
    message_repo: Arc<dyn MessageRepository>,
}

impl CaseHistoryUseCase {
    pub fn new(
        case_repo: Arc<dyn CaseRepository>,
        message_repo: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            case_repo,
            message_repo,
        }
    }

    /// The user's cases, newest first.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Case>, DomainError> {
        self.case_repo.list_cases(identity.uid()).await
    }

    pub async fn transcript(
        &self,
        identity: &Identity,
        case_id: &str,
    ) -> Result<Transcript, DomainError> {
        let case = self
            .case_repo
            .find_case(identity.uid(), case_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Case not found: {}", case_id)))?;

        let messages = self
            .message_repo
            .list_messages(identity.uid(), case_id)
            .await?;

        Ok(Transcript { case, messages })
    }
}
