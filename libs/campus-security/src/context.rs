use crate::role::Role;

/// `SecurityContext` carries the authorized caller of a request: who they are,
/// which organization the request is scoped to and which roles they hold.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    subject_id: String,
    email: String,
    org_id: Option<String>,
    roles: Vec<Role>,
    active_role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("organization id is required for this operation")]
    MissingOrgId,

    #[error("record belongs to organization '{actual}', request is scoped to '{expected}'")]
    CrossOrg { expected: String, actual: String },
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no subject, organization or roles
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    #[must_use]
    pub fn active_role(&self) -> Option<Role> {
        self.active_role
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_empty()
    }

    /// Organization id the request is scoped to.
    ///
    /// # Errors
    /// Returns [`ScopeError::MissingOrgId`] when the context carries no organization.
    pub fn require_org(&self) -> Result<&str, ScopeError> {
        self.org_id().ok_or(ScopeError::MissingOrgId)
    }

    /// Check that a record stamped with `record_org_id` may be touched by this request.
    ///
    /// # Errors
    /// Returns [`ScopeError::MissingOrgId`] for an unscoped context and
    /// [`ScopeError::CrossOrg`] when the organizations differ.
    pub fn ensure_same_org(&self, record_org_id: &str) -> Result<(), ScopeError> {
        let expected = self.require_org()?;
        if expected == record_org_id {
            Ok(())
        } else {
            Err(ScopeError::CrossOrg {
                expected: expected.to_owned(),
                actual: record_org_id.to_owned(),
            })
        }
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<String>,
    email: Option<String>,
    org_id: Option<String>,
    roles: Vec<Role>,
    active_role: Option<Role>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: &str) -> Self {
        self.subject_id = Some(subject_id.to_owned());
        self
    }

    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    #[must_use]
    pub fn org_id(mut self, org_id: Option<String>) -> Self {
        self.org_id = org_id.filter(|id| !id.is_empty());
        self
    }

    #[must_use]
    pub fn add_role(mut self, role: Role) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    #[must_use]
    pub fn roles(self, roles: &[Role]) -> Self {
        roles.iter().fold(self, |b, role| b.add_role(*role))
    }

    #[must_use]
    pub fn active_role(mut self, role: Role) -> Self {
        self.active_role = Some(role);
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            org_id: self.org_id,
            roles: self.roles,
            active_role: self.active_role,
        }
    }
}
