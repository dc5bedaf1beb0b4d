use serde::{Deserialize, Serialize};

use super::AIAnalysis;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub message: String,
}

impl RelayRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Normalized relay reply: always a human-readable string, optionally an advisory payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    /// Older relays answered with `response`; accepted on decode.
    #[serde(alias = "response")]
    pub reply: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AIAnalysis>,
}

impl RelayResponse {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            analysis: None,
        }
    }

    pub fn with_analysis(reply: impl Into<String>, analysis: AIAnalysis) -> Self {
        Self {
            reply: reply.into(),
            analysis: Some(analysis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_legacy_response_key() {
        let decoded: RelayResponse =
            serde_json::from_str(r#"{"response":"Rest and drink water."}"#).unwrap();
        assert_eq!(decoded.reply, "Rest and drink water.");
        assert!(decoded.analysis.is_none());
    }

    #[test]
    fn omits_missing_analysis() {
        let json = serde_json::to_value(RelayResponse::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "reply": "hi" }));
    }
}
