use futures_util::stream::{self, Stream};
use tokio::sync::watch;

use crate::domain::{ChatMessage, DomainError};

type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// Live view of one case's message collection.
///
/// Every change delivers the whole ordered list, never a delta. Dropping the
/// handle (or calling [`MessageSubscription::cancel`]) unregisters the listener.
pub struct MessageSubscription {
    key: String,
    receiver: watch::Receiver<Vec<ChatMessage>>,
    on_release: Option<ReleaseHook>,
}

impl MessageSubscription {
    pub fn new(key: impl Into<String>, receiver: watch::Receiver<Vec<ChatMessage>>) -> Self {
        Self {
            key: key.into(),
            receiver,
            on_release: None,
        }
    }

    /// Runs `hook` once this handle's receiver is gone, so the publisher can
    /// drop channels nobody listens to.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// Collection path this subscription listens to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The most recent snapshot, without waiting.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next change and returns the new snapshot.
    ///
    /// Intermediate snapshots are skipped when the reader falls behind; the
    /// returned list is always the latest one.
    pub async fn changed(&mut self) -> Result<Vec<ChatMessage>, DomainError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| DomainError::storage(format!("Subscription closed: {}", self.key)))?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    pub fn cancel(self) {
        drop(self);
    }

    /// Converts into a stream that yields the current snapshot first, then one
    /// snapshot per change, and ends when the store goes away.
    pub fn into_stream(mut self) -> impl Stream<Item = Vec<ChatMessage>> + Send {
        let initial = self.receiver.borrow_and_update().clone();
        stream::unfold((Some(initial), self), |(pending, mut sub)| async move {
            if let Some(snapshot) = pending {
                return Some((snapshot, (None, sub)));
            }
            match sub.changed().await {
                Ok(snapshot) => Some((snapshot, (None, sub))),
                Err(_) => None,
            }
        })
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        let Some(hook) = self.on_release.take() else {
            return;
        };
        // The hook must observe this receiver as already gone.
        let (_, detached) = watch::channel(Vec::new());
        drop(std::mem::replace(&mut self.receiver, detached));
        hook();
    }
}

impl std::fmt::Debug for MessageSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSubscription")
            .field("key", &self.key)
            .finish()
    }
}
