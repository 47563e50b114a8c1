//! Local (in-process) client for the org resolver module.

use std::sync::Arc;

use async_trait::async_trait;
use campus_security::{Identity, Role};
use org_resolver_sdk::{OrgResolverClient, OrgResolverError, ResolveOptions, ResolvedAccess};

use super::{DomainError, Service};

/// Local client wrapping the resolver service.
pub struct OrgResolverLocalClient {
    svc: Arc<Service>,
}

impl OrgResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> OrgResolverError {
    match &e {
        DomainError::Metadata(_) | DomainError::Database { .. } => {
            tracing::error!(operation = op, error = ?e, "org-resolver call failed");
        }
        _ => tracing::debug!(operation = op, error = %e, "org-resolver call rejected"),
    }
    e.into()
}

#[async_trait]
impl OrgResolverClient for OrgResolverLocalClient {
    async fn resolve(
        &self,
        identity: &Identity,
        options: &ResolveOptions,
    ) -> Result<ResolvedAccess, OrgResolverError> {
        self.svc
            .resolve(identity, options)
            .await
            .map_err(|e| log_and_convert("resolve", e))
    }

    async fn switch_active_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> Result<ResolvedAccess, OrgResolverError> {
        self.svc
            .switch_active_role(identity, role)
            .await
            .map_err(|e| log_and_convert("switch_active_role", e))
    }
}
