//! Config-driven identity provider for development and tests.
//!
//! Maps opaque bearer tokens to identities declared in configuration. Also
//! acts as the metadata store for those identities so role switching works
//! without an external provider.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use campus_security::{Identity, MetadataWriteError, MetadataWriter, UserMetadata};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AuthError;
use crate::provider::{IdentityProvider, extract_bearer_token};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthConfig {
    pub identities: Vec<StaticIdentity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticIdentity {
    pub token: String,
    pub id: String,
    pub email: String,
    /// Raw provider metadata, legacy key spellings allowed.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Default)]
struct Directory {
    token_to_id: HashMap<String, String>,
    identities: HashMap<String, Identity>,
}

#[derive(Default)]
pub struct StaticIdentityProvider {
    directory: RwLock<Directory>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn from_config(config: &StaticAuthConfig) -> Self {
        let provider = Self::default();
        for entry in &config.identities {
            if entry.token.trim().is_empty() {
                warn!(identity_id = %entry.id, "skipping static identity with empty token");
                continue;
            }
            provider.insert(
                &entry.token,
                Identity::from_raw_metadata(&entry.id, &entry.email, &entry.metadata),
            );
        }
        debug!(
            count = provider.directory.read().identities.len(),
            "static identities loaded"
        );
        provider
    }

    /// Register `identity` under `token`, replacing any previous holder of the token.
    pub fn insert(&self, token: &str, identity: Identity) {
        let mut dir = self.directory.write();
        if let Some(previous) = dir.token_to_id.insert(token.to_owned(), identity.id.clone())
            && previous != identity.id
        {
            warn!(previous = %previous, identity_id = %identity.id, "static token reassigned");
        }
        dir.identities.insert(identity.id.clone(), identity);
    }

    #[must_use]
    pub fn identity(&self, identity_id: &str) -> Option<Identity> {
        self.directory.read().identities.get(identity_id).cloned()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = extract_bearer_token(headers).ok_or(AuthError::Unauthenticated)?;
        let dir = self.directory.read();
        dir.token_to_id
            .get(token)
            .and_then(|id| dir.identities.get(id))
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_owned()))
    }
}

#[async_trait]
impl MetadataWriter for StaticIdentityProvider {
    async fn update_metadata(
        &self,
        identity_id: &str,
        metadata: UserMetadata,
    ) -> Result<(), MetadataWriteError> {
        let mut dir = self.directory.write();
        let identity = dir
            .identities
            .get_mut(identity_id)
            .ok_or_else(|| MetadataWriteError::IdentityNotFound(identity_id.to_owned()))?;
        identity.metadata = metadata;
        Ok(())
    }
}
