use async_trait::async_trait;

use crate::domain::{DomainError, RelayRequest, RelayResponse};

/// Client side of `POST /api/chat`.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn send(&self, request: &RelayRequest) -> Result<RelayResponse, DomainError>;
}
