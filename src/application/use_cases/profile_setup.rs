use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::application::ProfileRepository;
use crate::domain::{DomainError, Identity, UserProfile};

/// Creates or rewrites the profile document that unlocks the chat view.
pub struct ProfileSetupUseCase {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ProfileSetupUseCase {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }

    /// `fields` must be a JSON object. A rewrite keeps the original creation time.
    pub async fn setup(
        &self,
        identity: &Identity,
        fields: Value,
    ) -> Result<UserProfile, DomainError> {
        let Value::Object(fields) = fields else {
            return Err(DomainError::invalid_input(
                "Profile fields must be a JSON object",
            ));
        };

        let mut profile = UserProfile::new(identity.email().unwrap_or_default(), fields);
        if let Some(previous) = self.profile_repo.find_profile(identity.uid()).await? {
            profile = profile.created_at_from(&previous);
        }

        self.profile_repo
            .save_profile(identity.uid(), &profile)
            .await?;
        info!(uid = identity.uid(), "Profile saved");

        Ok(profile)
    }

    pub async fn get(&self, identity: &Identity) -> Result<Option<UserProfile>, DomainError> {
        self.profile_repo.find_profile(identity.uid()).await
    }
}
