use async_trait::async_trait;

use crate::domain::{AIAnalysis, Case, DomainError};

/// Persistence for `users/{uid}/cases/{caseId}` documents.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn create_case(&self, case: &Case) -> Result<(), DomainError>;

    async fn find_case(&self, uid: &str, case_id: &str) -> Result<Option<Case>, DomainError>;

    /// Cases owned by `uid`, newest first.
    async fn list_cases(&self, uid: &str) -> Result<Vec<Case>, DomainError>;

    /// Sets the advisory payload on an existing case. Fails with `NotFound` otherwise.
    async fn merge_analysis(
        &self,
        uid: &str,
        case_id: &str,
        analysis: &AIAnalysis,
    ) -> Result<(), DomainError>;
}
