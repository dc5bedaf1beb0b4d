use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageError(_))
    }

    pub fn is_upstream_error(&self) -> bool {
        matches!(self, Self::UpstreamError(_))
    }
}
