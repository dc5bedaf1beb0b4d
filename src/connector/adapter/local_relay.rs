use std::sync::Arc;

use async_trait::async_trait;

use crate::application::{HealthAnalysisUseCase, RelayClient};
use crate::domain::{DomainError, RelayRequest, RelayResponse};

/// Runs the relay pipeline in process instead of over HTTP.
pub struct LocalRelay {
    analysis: Arc<HealthAnalysisUseCase>,
}

impl LocalRelay {
    pub fn new(analysis: Arc<HealthAnalysisUseCase>) -> Self {
        Self { analysis }
    }
}

#[async_trait]
impl RelayClient for LocalRelay {
    async fn send(&self, request: &RelayRequest) -> Result<RelayResponse, DomainError> {
        self.analysis.analyze(&request.message).await
    }
}
