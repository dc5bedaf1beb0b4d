use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{
    CaseRepository, MessageRepository, MessageSubscription, ProfileRepository, RelayClient,
};
use crate::domain::{
    Case, ChatMessage, DomainError, Identity, NewMessage, RelayRequest, UserProfile,
};

/// Stored in place of a blank relay reply.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm here to help. Can you tell me more?";
/// Stored when the relay call or the reply write fails.
pub const APOLOGY_REPLY: &str = "Sorry, I couldn't process your message right now.";

/// Result of opening the chat view for a user.
pub enum ChatOpen {
    Ready(ChatSession),
    /// No profile document exists for the user yet.
    ProfileRequired,
}

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was written.
    Ignored,
    /// Another submission is still in flight; nothing was written.
    Busy,
    /// The relay answered and its reply was stored.
    Sent { reply: String },
    /// The relay or the reply write failed and the apology was stored.
    Failed,
}

/// Opens chat sessions: profile check, case creation, live message view.
pub struct ChatSessionUseCase {
    profile_repo: Arc<dyn ProfileRepository>,
    case_repo: Arc<dyn CaseRepository>,
    message_repo: Arc<dyn MessageRepository>,
    relay: Arc<dyn RelayClient>,
}

impl ChatSessionUseCase {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        case_repo: Arc<dyn CaseRepository>,
        message_repo: Arc<dyn MessageRepository>,
        relay: Arc<dyn RelayClient>,
    ) -> Self {
        Self {
            profile_repo,
            case_repo,
            message_repo,
            relay,
        }
    }

    /// Loads the profile, starts a new case and subscribes to its messages.
    pub async fn open(&self, identity: &Identity) -> Result<ChatOpen, DomainError> {
        debug!(uid = identity.uid(), "Opening chat");

        let Some(profile) = self.profile_repo.find_profile(identity.uid()).await? else {
            warn!(uid = identity.uid(), "User profile is missing");
            return Ok(ChatOpen::ProfileRequired);
        };

        let case = Case::start(identity);
        self.case_repo.create_case(&case).await?;
        info!(case_id = case.id(), "New case created");

        let subscription = self
            .message_repo
            .subscribe(identity.uid(), case.id())
            .await?;
        info!(case_id = case.id(), "Chat interface ready");

        Ok(ChatOpen::Ready(ChatSession {
            identity: identity.clone(),
            case,
            profile,
            subscription,
            sending: AtomicBool::new(false),
            case_repo: self.case_repo.clone(),
            message_repo: self.message_repo.clone(),
            relay: self.relay.clone(),
        }))
    }
}

/// One open chat view: a case, its mirrored message thread, and the send path.
///
/// Dropping the session cancels its store subscription.
pub struct ChatSession {
    identity: Identity,
    case: Case,
    profile: UserProfile,
    subscription: MessageSubscription,
    sending: AtomicBool,
    case_repo: Arc<dyn CaseRepository>,
    message_repo: Arc<dyn MessageRepository>,
    relay: Arc<dyn RelayClient>,
}

impl ChatSession {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn case_id(&self) -> &str {
        self.case.id()
    }

    /// The case as it was created; see [`ChatSession::current_case`] for merged analysis.
    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Current mirrored thread, ordered by creation.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.subscription.snapshot()
    }

    /// Waits for the store to report a change and returns the new thread.
    pub async fn changed(&mut self) -> Result<Vec<ChatMessage>, DomainError> {
        self.subscription.changed().await
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Re-reads the case document, including any analysis merged since opening.
    pub async fn current_case(&self) -> Result<Option<Case>, DomainError> {
        self.case_repo
            .find_case(self.identity.uid(), self.case.id())
            .await
    }

    /// Writes the user message, asks the relay, and writes the reply.
    ///
    /// The three steps run strictly in that order. Relay or store failures
    /// after the user write become an apology message instead of an error;
    /// only a failed user write is returned to the caller. A failed analysis
    /// merge after the reply is stored is only logged.
    pub async fn send_user_message(&self, text: &str) -> Result<SendOutcome, DomainError> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(case_id = self.case_id(), "Submission ignored: send in flight");
            return Ok(SendOutcome::Busy);
        }
        let _in_flight = InFlight(&self.sending);

        self.message_repo
            .append_message(self.identity.uid(), self.case.id(), NewMessage::user(text))
            .await?;

        match self.relay_and_record(text).await {
            Ok(reply) => Ok(SendOutcome::Sent { reply }),
            Err(e) => {
                warn!(case_id = self.case_id(), "AI backend failed: {e}");
                self.message_repo
                    .append_message(
                        self.identity.uid(),
                        self.case.id(),
                        NewMessage::bot(APOLOGY_REPLY),
                    )
                    .await?;
                Ok(SendOutcome::Failed)
            }
        }
    }

    pub fn close(self) {
        debug!(case_id = self.case_id(), "Closing chat");
        drop(self);
    }

    async fn relay_and_record(&self, text: &str) -> Result<String, DomainError> {
        let response = self.relay.send(&RelayRequest::new(text)).await?;

        let reply = if response.reply.trim().is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            response.reply
        };

        self.message_repo
            .append_message(
                self.identity.uid(),
                self.case.id(),
                NewMessage::bot(reply.clone()),
            )
            .await?;

        // The reply is already stored; a failed merge must not add an apology after it.
        if let Some(analysis) = response.analysis.filter(|a| !a.is_empty()) {
            match self
                .case_repo
                .merge_analysis(self.identity.uid(), self.case.id(), &analysis)
                .await
            {
                Ok(()) => debug!(case_id = self.case_id(), "Analysis merged onto case"),
                Err(e) => warn!(case_id = self.case_id(), "Failed to merge analysis: {e}"),
            }
        }

        Ok(reply)
    }
}

/// Clears the in-flight flag however the send exits.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
