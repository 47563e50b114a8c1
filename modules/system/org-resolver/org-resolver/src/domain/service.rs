use std::sync::Arc;

use campus_security::{Identity, MetadataWriter, Role, UserMetadata};
use org_resolver_sdk::{OrgSource, ResolveOptions, ResolvedAccess};
use tracing::{debug, info, instrument, warn};

use crate::config::OrgResolverConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::UserDirectory;
use crate::domain::strategy::{
    DefaultOrgStrategy, MetadataOrgStrategy, OrgStrategy, UserRecordOrgStrategy,
};

pub struct Service {
    strategies: Vec<Arc<dyn OrgStrategy>>,
    directory: Arc<dyn UserDirectory>,
    writer: Arc<dyn MetadataWriter>,
    config: OrgResolverConfig,
}

impl Service {
    /// Build the service with the standard source order:
    /// metadata, user record, configured default.
    #[must_use]
    pub fn new(
        config: OrgResolverConfig,
        directory: Arc<dyn UserDirectory>,
        writer: Arc<dyn MetadataWriter>,
    ) -> Self {
        let strategies: Vec<Arc<dyn OrgStrategy>> = vec![
            Arc::new(MetadataOrgStrategy),
            Arc::new(UserRecordOrgStrategy::new(directory.clone())),
            Arc::new(DefaultOrgStrategy::new(config.default_org_id.clone())),
        ];
        Self {
            strategies,
            directory,
            writer,
            config,
        }
    }

    #[instrument(
        skip(self, identity),
        fields(identity_id = %identity.id, require_org = options.require_org)
    )]
    pub async fn resolve(
        &self,
        identity: &Identity,
        options: &ResolveOptions,
    ) -> Result<ResolvedAccess, DomainError> {
        let mut resolved = None;
        for strategy in &self.strategies {
            if let Some(org_id) = strategy.org_id(identity, options).await {
                resolved = Some((org_id, strategy.source()));
                break;
            }
        }

        let conflicting_org_id = match &resolved {
            Some((org_id, OrgSource::Metadata)) if self.config.check_user_record => {
                self.user_record_conflict(identity, org_id).await
            }
            _ => None,
        };

        if resolved.is_none() && options.require_org {
            info!("no organization source answered");
            return Err(DomainError::MissingOrgId {
                identity_id: identity.id.clone(),
            });
        }

        let (roles, active_role) = effective_roles(&identity.metadata, self.config.baseline_role);
        let (org_id, org_source) = resolved.unzip();
        debug!(?org_source, %active_role, "identity resolved");

        Ok(ResolvedAccess {
            org_id,
            org_source,
            conflicting_org_id,
            roles,
            active_role,
        })
    }

    #[instrument(skip(self, identity), fields(identity_id = %identity.id, role = %role))]
    pub async fn switch_active_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> Result<ResolvedAccess, DomainError> {
        let (roles, _) = effective_roles(&identity.metadata, self.config.baseline_role);
        if !roles.contains(&role) {
            return Err(DomainError::RoleNotHeld { role });
        }

        let metadata = identity.metadata.clone().with_active_role(role);
        self.writer
            .update_metadata(&identity.id, metadata.clone())
            .await?;
        info!("active role switched");

        let updated = Identity {
            metadata,
            ..identity.clone()
        };
        self.resolve(&updated, &ResolveOptions::optional()).await
    }

    async fn user_record_conflict(&self, identity: &Identity, metadata_org: &str) -> Option<String> {
        match self.directory.get_org_id(&identity.id).await {
            Ok(Some(record_org)) if record_org != metadata_org => {
                warn!(
                    metadata_org_id = metadata_org,
                    user_record_org_id = %record_org,
                    "organization in metadata disagrees with user record, using metadata"
                );
                Some(record_org)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "user record consistency check skipped");
                None
            }
        }
    }
}

/// Roles held and the role to act with.
///
/// Falls back to `[baseline]` when metadata carries no roles, and to the first
/// held role when the active role is absent or not held.
#[must_use]
pub fn effective_roles(metadata: &UserMetadata, baseline: Role) -> (Vec<Role>, Role) {
    let roles = if metadata.roles.is_empty() {
        vec![baseline]
    } else {
        metadata.roles.clone()
    };
    let active = metadata
        .active_role
        .filter(|role| roles.contains(role))
        .unwrap_or(roles[0]);
    (roles, active)
}
