use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::{CaseRepository, MessageRepository, MessageSubscription, ProfileRepository};
use crate::domain::{
    current_timestamp, AIAnalysis, Case, ChatMessage, DomainError, NewMessage, UserProfile,
};

use super::{messages_key, SubscriptionHub};

type CaseKey = (String, String);

#[derive(Default)]
struct StoreState {
    profiles: HashMap<String, UserProfile>,
    cases: HashMap<CaseKey, Case>,
    messages: HashMap<CaseKey, Vec<ChatMessage>>,
}

/// Process-local store with the same collection layout as the DuckDB one.
pub struct InMemoryChatStore {
    state: Arc<Mutex<StoreState>>,
    hub: Arc<SubscriptionHub>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            hub: Arc::new(SubscriptionHub::new()),
        }
    }

    /// Live listeners on a case's messages.
    pub fn listener_count(&self, uid: &str, case_id: &str) -> usize {
        self.hub.listener_count(&messages_key(uid, case_id))
    }

    /// Message collections that still hold a live channel.
    pub fn channel_count(&self) -> usize {
        self.hub.channel_count()
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

fn case_key(uid: &str, case_id: &str) -> CaseKey {
    (uid.to_string(), case_id.to_string())
}

#[async_trait]
impl ProfileRepository for InMemoryChatStore {
    async fn find_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(uid).cloned())
    }

    async fn save_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.profiles.insert(uid.to_string(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl CaseRepository for InMemoryChatStore {
    async fn create_case(&self, case: &Case) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state
            .cases
            .insert(case_key(case.user_id(), case.id()), case.clone());
        debug!(case_id = case.id(), "Saved case to memory");
        Ok(())
    }

    async fn find_case(&self, uid: &str, case_id: &str) -> Result<Option<Case>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.cases.get(&case_key(uid, case_id)).cloned())
    }

    async fn list_cases(&self, uid: &str) -> Result<Vec<Case>, DomainError> {
        let state = self.state.lock().await;
        let mut cases: Vec<Case> = state
            .cases
            .values()
            .filter(|case| case.user_id() == uid)
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(a.id())));
        Ok(cases)
    }

    async fn merge_analysis(
        &self,
        uid: &str,
        case_id: &str,
        analysis: &AIAnalysis,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let case = state
            .cases
            .get_mut(&case_key(uid, case_id))
            .ok_or_else(|| DomainError::not_found(format!("Case not found: {}", case_id)))?;
        case.merge_analysis(analysis.clone());
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryChatStore {
    async fn append_message(
        &self,
        uid: &str,
        case_id: &str,
        message: NewMessage,
    ) -> Result<ChatMessage, DomainError> {
        let mut state = self.state.lock().await;
        let key = case_key(uid, case_id);
        if !state.cases.contains_key(&key) {
            return Err(DomainError::not_found(format!("Case not found: {}", case_id)));
        }

        let thread = state.messages.entry(key).or_default();
        let (last_created, last_sequence) = thread
            .last()
            .map(|m| (m.created_at(), m.sequence()))
            .unwrap_or((0, 0));

        let stored = ChatMessage::reconstitute(
            Uuid::new_v4().to_string(),
            message.role,
            message.text,
            current_timestamp().max(last_created),
            last_sequence + 1,
        );
        thread.push(stored.clone());

        let collection = messages_key(uid, case_id);
        if self.hub.has_listeners(&collection) {
            self.hub.publish(&collection, thread.clone());
        }

        Ok(stored)
    }

    async fn list_messages(
        &self,
        uid: &str,
        case_id: &str,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .messages
            .get(&case_key(uid, case_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn subscribe(
        &self,
        uid: &str,
        case_id: &str,
    ) -> Result<MessageSubscription, DomainError> {
        let state = self.state.lock().await;
        let current = state
            .messages
            .get(&case_key(uid, case_id))
            .cloned()
            .unwrap_or_default();
        Ok(self.hub.subscribe(&messages_key(uid, case_id), current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;

    #[tokio::test]
    async fn unknown_case_is_not_found() {
        let store = InMemoryChatStore::new();

        let err = store
            .append_message("u1", "missing", NewMessage::user("hello"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .merge_analysis("u1", "missing", &AIAnalysis::baseline())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(store.list_messages("u1", "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cases_are_scoped_to_their_owner() {
        let store = InMemoryChatStore::new();
        let case = Case::start(&Identity::new("u1", None));
        store.create_case(&case).await.unwrap();

        let err = store
            .append_message("u2", case.id(), NewMessage::user("not mine"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.find_case("u2", case.id()).await.unwrap().is_none());
        assert!(store.list_cases("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn messages_get_increasing_sequence() {
        let store = InMemoryChatStore::new();
        let case = Case::start(&Identity::new("u1", None));
        store.create_case(&case).await.unwrap();

        let first = store
            .append_message("u1", case.id(), NewMessage::user("one"))
            .await
            .unwrap();
        let second = store
            .append_message("u1", case.id(), NewMessage::bot("two"))
            .await
            .unwrap();

        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 2);
        assert!(second.created_at() >= first.created_at());
    }
}
