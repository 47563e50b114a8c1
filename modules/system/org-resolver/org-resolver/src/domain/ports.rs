use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Read access to the persisted user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Organization stamped on the user row, `None` when the row is missing
    /// or carries no organization.
    async fn get_org_id(&self, identity_id: &str) -> Result<Option<String>, DomainError>;
}
