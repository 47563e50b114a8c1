use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use campus_security::{Identity, SecurityContext};
use org_resolver_sdk::{OrgResolverClient, OrgResolverError, ResolvedAccess};
use tracing::debug;

use crate::axum_ext::GuardState;
use crate::errors::AuthError;
use crate::policy::AccessPolicy;
use crate::provider::IdentityProvider;

/// Progress of a request through the guard. A failed transition is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStage {
    Unauthenticated,
    Authenticated,
    Scoped,
    Authorized,
}

impl fmt::Display for GuardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GuardStage::Unauthenticated => "unauthenticated",
            GuardStage::Authenticated => "authenticated",
            GuardStage::Scoped => "scoped",
            GuardStage::Authorized => "authorized",
        })
    }
}

/// Outcome of a successful [`Guard::authorize`].
#[derive(Debug, Clone)]
pub struct Authorized {
    pub identity: Identity,
    pub access: ResolvedAccess,
    pub ctx: SecurityContext,
}

/// Authentication and organization resolution shared by every guarded route.
#[derive(Clone)]
pub struct Guard {
    provider: Arc<dyn IdentityProvider>,
    resolver: Arc<dyn OrgResolverClient>,
}

impl Guard {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, resolver: Arc<dyn OrgResolverClient>) -> Self {
        Self { provider, resolver }
    }

    /// Middleware state enforcing `policy` on the routes it is layered on.
    #[must_use]
    pub fn with_policy(&self, policy: AccessPolicy) -> GuardState {
        GuardState::new(self.clone(), policy)
    }

    /// Run the request through authentication, scoping and the role check.
    ///
    /// # Errors
    /// - [`AuthError::Unauthenticated`] / [`AuthError::InvalidToken`] without a valid identity
    /// - [`AuthError::MissingOrgId`] when the policy requires an organization and none resolves
    /// - [`AuthError::Forbidden`] when the caller's role is not allowed
    /// - [`AuthError::Internal`] when the resolver fails
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        policy: &AccessPolicy,
    ) -> Result<Authorized, AuthError> {
        let identity = self.provider.authenticate(headers).await.inspect_err(|e| {
            debug!(stage = %GuardStage::Unauthenticated, error = %e, "request rejected");
        })?;

        let access = self
            .resolver
            .resolve(&identity, &policy.resolve_options())
            .await
            .map_err(|e| {
                debug!(stage = %GuardStage::Authenticated, identity_id = %identity.id, error = %e, "request rejected");
                match e {
                    OrgResolverError::MissingOrgId { .. } => AuthError::MissingOrgId,
                    other => AuthError::Internal(other.to_string()),
                }
            })?;

        policy.check_roles(&access).inspect_err(|e| {
            debug!(stage = %GuardStage::Scoped, identity_id = %identity.id, error = %e, "request rejected");
        })?;

        let ctx = access.to_security_context(&identity);
        debug!(
            stage = %GuardStage::Authorized,
            identity_id = %identity.id,
            org_id = ctx.org_id().unwrap_or_default(),
            active_role = %access.active_role,
            "request authorized"
        );

        Ok(Authorized {
            identity,
            access,
            ctx,
        })
    }
}
