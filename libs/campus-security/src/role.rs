use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A role a campus user can hold inside an organization.
///
/// `guardian` is accepted as a legacy spelling of [`Role::Parent`] when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Principal,
    Teacher,
    #[serde(alias = "guardian")]
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Principal, Role::Teacher, Role::Parent];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Principal => "principal",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }

    /// Roles allowed to act on behalf of the whole organization.
    #[must_use]
    pub const fn is_staff_admin(self) -> bool {
        matches!(self, Role::Admin | Role::Principal)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "principal" => Ok(Role::Principal),
            "teacher" => Ok(Role::Teacher),
            "parent" | "guardian" => Ok(Role::Parent),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}
