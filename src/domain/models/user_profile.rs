use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::current_timestamp;

/// Profile document created at setup. Its presence gates the chat view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    email: String,
    created_at: i64,
    /// Free-form profile answers (age, village, known conditions, ...).
    fields: Map<String, Value>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            email: email.into(),
            created_at: current_timestamp(),
            fields,
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(email: String, created_at: i64, fields: Map<String, Value>) -> Self {
        Self {
            email,
            created_at,
            fields,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Keeps the original creation time when a profile is rewritten.
    pub fn created_at_from(mut self, previous: &UserProfile) -> Self {
        self.created_at = previous.created_at;
        self
    }
}
