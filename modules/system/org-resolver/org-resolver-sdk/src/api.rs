//! Public API trait for the org resolver.

use async_trait::async_trait;
use campus_security::{Identity, Role};

use crate::error::OrgResolverError;
use crate::models::{ResolveOptions, ResolvedAccess};

/// Resolves which organization and roles an authenticated identity acts with.
#[async_trait]
pub trait OrgResolverClient: Send + Sync {
    /// Resolve organization scope and roles for `identity`.
    ///
    /// Organization sources are tried in order: identity metadata, the
    /// persisted user record, then the configured default (only when
    /// `options.allow_default` is set).
    ///
    /// # Errors
    ///
    /// - `MissingOrgId` if no source yields an organization and
    ///   `options.require_org` is set
    /// - `Internal` for unexpected failures
    async fn resolve(
        &self,
        identity: &Identity,
        options: &ResolveOptions,
    ) -> Result<ResolvedAccess, OrgResolverError>;

    /// Make `role` the active role of `identity` and persist it.
    ///
    /// # Errors
    ///
    /// - `RoleNotHeld` if `role` is not among the identity's roles
    /// - `IdentityNotFound` if the metadata store does not know the identity
    /// - `Internal` if persisting the metadata fails
    async fn switch_active_role(
        &self,
        identity: &Identity,
        role: Role,
    ) -> Result<ResolvedAccess, OrgResolverError>;
}
