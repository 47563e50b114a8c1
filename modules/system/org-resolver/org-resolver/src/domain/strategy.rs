//! Organization id sources, tried in order until one answers.

use std::sync::Arc;

use async_trait::async_trait;
use campus_security::Identity;
use org_resolver_sdk::{OrgSource, ResolveOptions};
use tracing::{debug, warn};

use crate::domain::ports::UserDirectory;

#[async_trait]
pub trait OrgStrategy: Send + Sync {
    fn source(&self) -> OrgSource;

    /// `None` means "no answer here, ask the next source".
    async fn org_id(&self, identity: &Identity, options: &ResolveOptions) -> Option<String>;
}

/// Organization carried in the identity metadata.
pub struct MetadataOrgStrategy;

#[async_trait]
impl OrgStrategy for MetadataOrgStrategy {
    fn source(&self) -> OrgSource {
        OrgSource::Metadata
    }

    async fn org_id(&self, identity: &Identity, _options: &ResolveOptions) -> Option<String> {
        identity.metadata.org_id.clone()
    }
}

/// Organization stamped on the persisted user record.
pub struct UserRecordOrgStrategy {
    directory: Arc<dyn UserDirectory>,
}

impl UserRecordOrgStrategy {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl OrgStrategy for UserRecordOrgStrategy {
    fn source(&self) -> OrgSource {
        OrgSource::UserRecord
    }

    async fn org_id(&self, identity: &Identity, _options: &ResolveOptions) -> Option<String> {
        match self.directory.get_org_id(&identity.id).await {
            Ok(org_id) => org_id.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                warn!(identity_id = %identity.id, error = %e, "user record lookup failed, trying next source");
                None
            }
        }
    }
}

/// Configured fallback organization, only for callers that opt in.
pub struct DefaultOrgStrategy {
    default_org_id: Option<String>,
}

impl DefaultOrgStrategy {
    #[must_use]
    pub fn new(default_org_id: Option<String>) -> Self {
        Self {
            default_org_id: default_org_id.filter(|id| !id.trim().is_empty()),
        }
    }
}

#[async_trait]
impl OrgStrategy for DefaultOrgStrategy {
    fn source(&self) -> OrgSource {
        OrgSource::Default
    }

    async fn org_id(&self, identity: &Identity, options: &ResolveOptions) -> Option<String> {
        if !options.allow_default {
            return None;
        }
        if self.default_org_id.is_some() {
            debug!(identity_id = %identity.id, "falling back to configured default organization");
        }
        self.default_org_id.clone()
    }
}
