use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Bot,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "user" => Role::User,
            "bot" | "assistant" => Role::Bot,
            "system" => Role::System,
            unknown => {
                warn!("Unknown message role '{}', treating as bot", unknown);
                Role::Bot
            }
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message as submitted by the client, before the store stamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: Role,
    pub text: String,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// A persisted chat message. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: String,
    role: Role,
    text: String,
    created_at: i64,
    /// Per-case write counter; breaks ties between messages stamped in the same millisecond.
    sequence: u64,
}

impl ChatMessage {
    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(
        id: String,
        role: Role,
        text: String,
        created_at: i64,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            role,
            text,
            created_at,
            sequence,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Total order used by every listing and subscription snapshot.
    pub fn chronological(a: &ChatMessage, b: &ChatMessage) -> Ordering {
        a.created_at
            .cmp(&b.created_at)
            .then(a.sequence.cmp(&b.sequence))
    }
}
