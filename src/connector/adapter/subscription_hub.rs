use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::watch;
use tracing::debug;

use crate::application::MessageSubscription;
use crate::domain::ChatMessage;

/// Path of a case's message collection; the key subscriptions are registered under.
pub fn messages_key(uid: &str, case_id: &str) -> String {
    format!("users/{uid}/cases/{case_id}/messages")
}

/// Fan-out of message snapshots to live subscriptions.
///
/// Stores call [`SubscriptionHub::publish`] while still holding their own
/// write lock, so listeners observe snapshots in write order. A channel is
/// dropped as soon as its last subscription goes away.
#[derive(Default)]
pub struct SubscriptionHub {
    channels: Arc<Mutex<Channels>>,
}

type Channels = HashMap<String, watch::Sender<Vec<ChatMessage>>>;

fn lock_channels(channels: &Mutex<Channels>) -> MutexGuard<'_, Channels> {
    channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes `key` when no receiver is left on it.
fn release(channels: &Weak<Mutex<Channels>>, key: &str) {
    let Some(channels) = channels.upgrade() else {
        return;
    };
    let mut channels = lock_channels(&channels);
    if channels
        .get(key)
        .is_some_and(|sender| sender.receiver_count() == 0)
    {
        channels.remove(key);
        debug!(key, "Released channel without listeners");
    }
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        lock_channels(&self.channels)
    }

    /// Registers a listener on `key`, seeded with `current`.
    pub fn subscribe(&self, key: &str, current: Vec<ChatMessage>) -> MessageSubscription {
        let mut channels = self.lock();
        let receiver = match channels.get(key) {
            Some(sender) => {
                sender.send_if_modified(|snapshot| {
                    if *snapshot != current {
                        *snapshot = current;
                        true
                    } else {
                        false
                    }
                });
                sender.subscribe()
            }
            None => {
                let (sender, receiver) = watch::channel(current);
                channels.insert(key.to_string(), sender);
                receiver
            }
        };
        debug!(key, "Listener registered");

        let channels = Arc::downgrade(&self.channels);
        let owned_key = key.to_string();
        MessageSubscription::new(key, receiver)
            .on_release(move || release(&channels, &owned_key))
    }

    /// Collections that currently hold a channel.
    pub fn channel_count(&self) -> usize {
        self.lock().len()
    }

    /// True when at least one live subscription watches `key`.
    pub fn has_listeners(&self, key: &str) -> bool {
        self.listener_count(key) > 0
    }

    pub fn listener_count(&self, key: &str) -> usize {
        self.lock()
            .get(key)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Replaces the snapshot for `key` and wakes its listeners.
    pub fn publish(&self, key: &str, snapshot: Vec<ChatMessage>) {
        let mut channels = self.lock();
        let Some(sender) = channels.get(key) else {
            return;
        };

        if sender.receiver_count() == 0 {
            channels.remove(key);
            debug!(key, "Dropped channel without listeners");
            return;
        }

        debug!(key, messages = snapshot.len(), "Publishing snapshot");
        sender.send_replace(snapshot);
    }
}
