//! Error types for the org resolver module.

use campus_security::Role;
use thiserror::Error;

/// Errors that can occur when using the org resolver API.
#[derive(Debug, Error)]
pub enum OrgResolverError {
    /// No source produced an organization id and the caller required one.
    #[error("organization id is missing for identity '{identity_id}'")]
    MissingOrgId {
        /// The identity whose organization could not be resolved.
        identity_id: String,
    },

    /// The requested role is not among the roles held by the identity.
    #[error("role '{role}' is not held by this user")]
    RoleNotHeld { role: Role },

    /// The identity is unknown to the metadata store.
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
