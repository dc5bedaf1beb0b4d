use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_timestamp, AIAnalysis, Identity};

/// One chat conversation. Owns an ordered message list and an optional advisory summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    id: String,
    user_id: String,
    started_by: String,
    created_at: i64,
    analysis: Option<AIAnalysis>,
    analysis_updated_at: Option<i64>,
}

impl Case {
    /// Starts a new case for `identity` with a client-generated id.
    pub fn start(identity: &Identity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: identity.uid().to_string(),
            started_by: identity.email().unwrap_or("anonymous").to_string(),
            created_at: current_timestamp(),
            analysis: None,
            analysis_updated_at: None,
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(
        id: String,
        user_id: String,
        started_by: String,
        created_at: i64,
        analysis: Option<AIAnalysis>,
        analysis_updated_at: Option<i64>,
    ) -> Self {
        Self {
            id,
            user_id,
            started_by,
            created_at,
            analysis,
            analysis_updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn started_by(&self) -> &str {
        &self.started_by
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn analysis(&self) -> Option<&AIAnalysis> {
        self.analysis.as_ref()
    }

    pub fn analysis_updated_at(&self) -> Option<i64> {
        self.analysis_updated_at
    }

    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }

    /// Replaces the advisory payload and stamps the update time.
    pub fn merge_analysis(&mut self, analysis: AIAnalysis) {
        self.analysis = Some(analysis);
        self.analysis_updated_at = Some(current_timestamp());
    }

    pub fn summary(&self) -> String {
        match self.analysis.as_ref().and_then(|a| a.diagnosis.as_deref()) {
            Some(diagnosis) => format!("{} ({})", self.id, diagnosis),
            None => self.id.clone(),
        }
    }
}
