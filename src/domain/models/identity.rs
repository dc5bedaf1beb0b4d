use serde::{Deserialize, Serialize};

/// A signed-in user. Passed explicitly into every data-access call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    uid: String,
    email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.filter(|e| !e.trim().is_empty()),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
