use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::UserMetadata;

/// An authenticated principal as handed out by the credential provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub metadata: UserMetadata,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, metadata: UserMetadata) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            metadata,
        }
    }

    /// Build an identity from the provider's untyped metadata bag.
    #[must_use]
    pub fn from_raw_metadata(id: impl Into<String>, email: impl Into<String>, raw: &Value) -> Self {
        Self::new(id, email, UserMetadata::from_raw(raw))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataWriteError {
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("metadata store failure: {0}")]
    Store(String),
}

/// The only write path into identity metadata.
#[async_trait]
pub trait MetadataWriter: Send + Sync {
    /// Replace the stored metadata of `identity_id`.
    ///
    /// # Errors
    /// Returns [`MetadataWriteError::IdentityNotFound`] for an unknown identity
    /// and [`MetadataWriteError::Store`] if the backing store rejects the write.
    async fn update_metadata(
        &self,
        identity_id: &str,
        metadata: UserMetadata,
    ) -> Result<(), MetadataWriteError>;
}
