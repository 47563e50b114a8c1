use campus_security::Role;
use org_resolver_sdk::{ResolveOptions, ResolvedAccess};

use crate::errors::AuthError;

/// Which of the caller's roles a policy inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleMatch {
    /// Only the currently active role counts.
    #[default]
    Active,
    /// Any role the caller holds counts.
    AnyHeld,
}

/// Per-route access requirements enforced by the guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub require_org: bool,
    pub allow_default_org: bool,
    /// Empty means any authenticated caller.
    pub allowed_roles: Vec<Role>,
    pub role_match: RoleMatch,
}

impl AccessPolicy {
    /// Any authenticated identity, organization optional.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Authenticated identity with a resolved organization.
    #[must_use]
    pub fn org_scoped() -> Self {
        Self {
            require_org: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn allow_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.allowed_roles = roles.into_iter().collect();
        self
    }

    #[must_use]
    pub fn match_any_held_role(mut self) -> Self {
        self.role_match = RoleMatch::AnyHeld;
        self
    }

    #[must_use]
    pub fn allow_default_org(mut self) -> Self {
        self.allow_default_org = true;
        self
    }

    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            require_org: self.require_org,
            allow_default: self.allow_default_org,
        }
    }

    /// # Errors
    /// [`AuthError::Forbidden`] when the policy lists roles and the caller
    /// matches none of them.
    pub fn check_roles(&self, access: &ResolvedAccess) -> Result<(), AuthError> {
        if self.allowed_roles.is_empty() {
            return Ok(());
        }
        let allowed = match self.role_match {
            RoleMatch::Active => self.allowed_roles.contains(&access.active_role),
            RoleMatch::AnyHeld => access.roles.iter().any(|r| self.allowed_roles.contains(r)),
        };
        if allowed {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                required: self.allowed_roles.clone(),
                actual: access.active_role,
            })
        }
    }
}
