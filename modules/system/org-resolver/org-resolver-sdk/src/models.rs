//! Models for the org resolver API.

use campus_security::{Identity, Role, SecurityContext};
use serde::{Deserialize, Serialize};

/// Options for [`crate::OrgResolverClient::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fail with `MissingOrgId` when no organization can be resolved.
    pub require_org: bool,
    /// Allow the configured default organization as a last resort.
    ///
    /// Only for flows that are not authorization-critical, such as signup.
    pub allow_default: bool,
}

impl ResolveOptions {
    /// Organization is mandatory, no default fallback.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            require_org: true,
            allow_default: false,
        }
    }

    /// Organization is optional, no default fallback.
    #[must_use]
    pub const fn optional() -> Self {
        Self {
            require_org: false,
            allow_default: false,
        }
    }

    #[must_use]
    pub const fn with_default(mut self) -> Self {
        self.allow_default = true;
        self
    }
}

/// Where a resolved organization id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgSource {
    Metadata,
    UserRecord,
    Default,
}

/// Result of resolving an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccess {
    pub org_id: Option<String>,
    pub org_source: Option<OrgSource>,
    /// Organization id of the persisted user record when it disagrees with
    /// the winning metadata value.
    pub conflicting_org_id: Option<String>,
    /// Never empty.
    pub roles: Vec<Role>,
    /// Always a member of `roles`.
    pub active_role: Role,
}

impl ResolvedAccess {
    #[must_use]
    pub fn to_security_context(&self, identity: &Identity) -> SecurityContext {
        SecurityContext::builder()
            .subject_id(&identity.id)
            .email(&identity.email)
            .org_id(self.org_id.clone())
            .roles(&self.roles)
            .active_role(self.active_role)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_security::UserMetadata;

    #[test]
    fn security_context_carries_resolved_scope() {
        let identity = Identity::new("user-1", "u1@school.test", UserMetadata::default());
        let access = ResolvedAccess {
            org_id: Some("org-42".to_owned()),
            org_source: Some(OrgSource::UserRecord),
            conflicting_org_id: None,
            roles: vec![Role::Teacher, Role::Parent],
            active_role: Role::Parent,
        };

        let ctx = access.to_security_context(&identity);
        assert_eq!(ctx.subject_id(), "user-1");
        assert_eq!(ctx.org_id(), Some("org-42"));
        assert_eq!(ctx.roles(), &[Role::Teacher, Role::Parent]);
        assert_eq!(ctx.active_role(), Some(Role::Parent));
    }

    #[test]
    fn org_source_serializes_snake_case() {
        let json = serde_json::to_string(&OrgSource::UserRecord).ok();
        assert_eq!(json.as_deref(), Some("\"user_record\""));
    }
}
