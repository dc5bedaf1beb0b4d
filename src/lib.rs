pub mod application;
pub mod cli;
pub mod config;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use config::Config;

pub use application::{
    CaseHistoryUseCase, CaseRepository, ChatClient, ChatSession, ChatSessionUseCase,
    HealthAnalysisUseCase, MessageRepository, ProfileRepository, ProfileSetupUseCase, RelayClient,
};

pub use connector::{
    DuckdbChatStore, HttpRelayClient, InMemoryChatStore, LocalRelay, MockChatClient,
    OpenRouterClient,
};

pub use domain::{
    AIAnalysis, Case, ChatMessage, DomainError, Identity, NewMessage, RelayRequest, RelayResponse,
    Role, UserProfile,
};
