use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::{
    CaseHistoryUseCase, CaseRepository, ChatClient, ChatSessionUseCase, GuardChain,
    HealthAnalysisUseCase, MessageRepository, ProfileRepository, ProfileSetupUseCase,
    RelayClient, Route,
};
use crate::config::{expand_tilde, Config};
use crate::connector::http::RelayState;
use crate::connector::{
    DuckdbChatStore, HttpRelayClient, InMemoryChatStore, LocalRelay, MockChatClient,
    OpenRouterClient,
};

type StoreHandles = (
    Arc<dyn ProfileRepository>,
    Arc<dyn CaseRepository>,
    Arc<dyn MessageRepository>,
);

/// One store object serves all three collections.
fn split_store<S>(store: Arc<S>) -> StoreHandles
where
    S: ProfileRepository + CaseRepository + MessageRepository + 'static,
{
    (
        store.clone() as Arc<dyn ProfileRepository>,
        store.clone() as Arc<dyn CaseRepository>,
        store as Arc<dyn MessageRepository>,
    )
}

pub struct ContainerConfig {
    pub settings: Config,
    /// Keep profiles, cases and messages in process memory instead of DuckDB.
    pub memory_storage: bool,
    /// Answer upstream calls with [`MockChatClient`] instead of OpenRouter.
    pub mock_llm: bool,
    /// Run the relay pipeline in process instead of calling `settings.relay_url`.
    pub local_relay: bool,
}

pub struct Container {
    profile_repo: Arc<dyn ProfileRepository>,
    case_repo: Arc<dyn CaseRepository>,
    message_repo: Arc<dyn MessageRepository>,
    analysis: Arc<HealthAnalysisUseCase>,
    relay: Arc<dyn RelayClient>,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let (profile_repo, case_repo, message_repo) = Self::open_store(&config)?;

        // Upstream model client; absent when no credential is configured
        let chat_client: Option<Arc<dyn ChatClient>> = if config.mock_llm {
            debug!("Using mock chat client");
            Some(Arc::new(MockChatClient::new()))
        } else if let Some(key) = config.settings.openrouter_api_key.as_deref() {
            debug!(
                "Using OpenRouter at {} with model {}",
                config.settings.openrouter_base_url, config.settings.openrouter_model
            );
            Some(Arc::new(OpenRouterClient::new(
                key,
                config.settings.openrouter_model.as_str(),
                config.settings.openrouter_base_url.as_str(),
                config.settings.upstream_timeout(),
            )?))
        } else {
            warn!("OPENROUTER_API_KEY is not set; relay answers with a misconfiguration notice");
            None
        };
        let analysis = Arc::new(HealthAnalysisUseCase::new(chat_client));

        let relay: Arc<dyn RelayClient> = if config.local_relay {
            debug!("Using in-process relay");
            Arc::new(LocalRelay::new(analysis.clone()))
        } else {
            debug!("Using relay at {}", config.settings.relay_url);
            Arc::new(HttpRelayClient::new(config.settings.relay_url.as_str()))
        };

        Ok(Self {
            profile_repo,
            case_repo,
            message_repo,
            analysis,
            relay,
            config,
        })
    }

    fn open_store(config: &ContainerConfig) -> Result<StoreHandles> {
        if config.memory_storage {
            debug!("Using in-memory chat storage");
            return Ok(split_store(Arc::new(InMemoryChatStore::new())));
        }

        let data_dir = expand_tilde(&config.settings.data_dir);
        std::fs::create_dir_all(&data_dir)?;
        let db_path = PathBuf::from(&data_dir).join("swasthya.duckdb");

        match DuckdbChatStore::new(&db_path) {
            Ok(duckdb) => {
                debug!("Using DuckDB chat storage at {:?}", db_path);
                Ok(split_store(Arc::new(duckdb)))
            }
            Err(e) => {
                warn!(
                    "Failed to initialize DuckDB ({}): {}. Falling back to in-memory storage.",
                    db_path.display(),
                    e
                );
                Ok(split_store(Arc::new(InMemoryChatStore::new())))
            }
        }
    }

    pub fn chat_session_use_case(&self) -> ChatSessionUseCase {
        ChatSessionUseCase::new(
            self.profile_repo.clone(),
            self.case_repo.clone(),
            self.message_repo.clone(),
            self.relay.clone(),
        )
    }

    pub fn profile_setup_use_case(&self) -> ProfileSetupUseCase {
        ProfileSetupUseCase::new(self.profile_repo.clone())
    }

    pub fn case_history_use_case(&self) -> CaseHistoryUseCase {
        CaseHistoryUseCase::new(self.case_repo.clone(), self.message_repo.clone())
    }

    /// Guard chain protecting `route`.
    pub fn guards(&self, route: Route) -> GuardChain {
        route.guards(self.profile_repo.clone())
    }

    pub fn relay_state(&self) -> Arc<RelayState> {
        Arc::new(RelayState {
            analysis: self.analysis.clone(),
        })
    }

    pub fn settings(&self) -> &Config {
        &self.config.settings
    }
}
