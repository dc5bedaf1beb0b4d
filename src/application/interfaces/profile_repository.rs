use async_trait::async_trait;

use crate::domain::{DomainError, UserProfile};

/// Persistence for `users/{uid}` profile documents.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError>;

    /// Creates or replaces the profile for `uid`.
    async fn save_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), DomainError>;
}
