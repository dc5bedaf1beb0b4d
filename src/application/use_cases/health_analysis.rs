use std::sync::Arc;

use tracing::{debug, error, info};

use crate::application::ChatClient;
use crate::domain::{AIAnalysis, DomainError, RelayResponse};

/// Fixed instruction sent ahead of every user message.
pub const SYSTEM_PROMPT: &str = "\
You are SwasthyaAI, a caring AI health assistant for rural India. Provide clear, \
simple, and safe medical suggestions: mention possible causes, home remedies, \
and when to see a doctor.";

pub const MISCONFIGURED_REPLY: &str = "Backend misconfigured: no API key found.";
pub const EMPTY_COMPLETION_REPLY: &str = "I'm sorry, I couldn't process your request right now.";
pub const DEGRADED_REPLY: &str = "The AI system faced an issue. Please try again later.";

/// The relay pipeline: one user message in, one normalized reply out.
///
/// Never turns an upstream problem into an error. A missing credential yields
/// a misconfiguration notice without touching the network, and a failed
/// upstream call yields an apology with an empty advisory payload. The only
/// error this returns is `InvalidInput` for an empty message; whitespace-only
/// text still goes upstream.
pub struct HealthAnalysisUseCase {
    chat_client: Option<Arc<dyn ChatClient>>,
}

impl HealthAnalysisUseCase {
    /// `chat_client` is `None` when no upstream credential is configured.
    pub fn new(chat_client: Option<Arc<dyn ChatClient>>) -> Self {
        Self { chat_client }
    }

    pub fn is_configured(&self) -> bool {
        self.chat_client.is_some()
    }

    pub async fn analyze(&self, message: &str) -> Result<RelayResponse, DomainError> {
        if message.is_empty() {
            return Err(DomainError::invalid_input("Message is required."));
        }

        let Some(client) = self.chat_client.as_ref() else {
            error!("Missing upstream API key; answering with misconfiguration notice");
            return Ok(RelayResponse::text(MISCONFIGURED_REPLY));
        };

        match client.complete(SYSTEM_PROMPT, message).await {
            Ok(completion) => {
                let completion = completion.trim();
                debug!(chars = completion.len(), "Upstream completion received");
                let reply = if completion.is_empty() {
                    EMPTY_COMPLETION_REPLY
                } else {
                    completion
                };
                info!("Health analysis answered");
                Ok(RelayResponse::with_analysis(reply, AIAnalysis::baseline()))
            }
            Err(e) => {
                error!("Error in AI pipeline: {e}. Answering with degraded reply.");
                Ok(RelayResponse::with_analysis(
                    DEGRADED_REPLY,
                    AIAnalysis::degraded(),
                ))
            }
        }
    }
}
