//! Typed user metadata.
//!
//! Identity providers hand out a loose JSON bag. Older accounts carry legacy
//! key spellings (`organization_id`, `orgId`, `active_role`, a single `role`
//! string), so the bag is migrated into [`UserMetadata`] once at the boundary
//! and nothing downstream looks at the raw JSON again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::role::Role;

/// Current metadata schema version written by [`UserMetadata::to_raw`].
pub const METADATA_VERSION: u32 = 1;

const ORG_ID_KEYS: [&str; 3] = ["org_id", "organization_id", "orgId"];
const ACTIVE_ROLE_KEYS: [&str; 2] = ["activeRole", "active_role"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub version: u32,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub active_role: Option<Role>,
    #[serde(default)]
    pub org_id: Option<String>,
}

impl Default for UserMetadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION,
            roles: Vec::new(),
            active_role: None,
            org_id: None,
        }
    }
}

impl UserMetadata {
    /// Migrate a raw metadata bag into the current schema.
    ///
    /// Never fails: malformed fields are dropped (with a warning for unknown
    /// role names) and missing ones stay empty.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        let Some(map) = raw.as_object() else {
            return Self::default();
        };

        let source_version = map
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);
        if source_version < METADATA_VERSION {
            debug!(source_version, "migrating unversioned user metadata");
        }

        let org_id = first_non_empty(map, &ORG_ID_KEYS);

        let mut roles = Vec::new();
        match map.get("roles") {
            Some(Value::Array(items)) => {
                for item in items.iter().filter_map(Value::as_str) {
                    push_role(&mut roles, item);
                }
            }
            Some(Value::String(single)) => push_role(&mut roles, single),
            _ => {}
        }
        if roles.is_empty()
            && let Some(legacy) = map.get("role").and_then(Value::as_str)
        {
            push_role(&mut roles, legacy);
        }

        let active_role =
            first_non_empty(map, &ACTIVE_ROLE_KEYS).and_then(|name| match name.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!(error = %e, "ignoring unknown active role in user metadata");
                    None
                }
            });

        Self {
            version: METADATA_VERSION,
            roles,
            active_role,
            org_id,
        }
    }

    /// Render the metadata with canonical key names.
    #[must_use]
    pub fn to_raw(&self) -> Value {
        serde_json::json!({
            "version": self.version,
            "roles": self.roles,
            "activeRole": self.active_role,
            "org_id": self.org_id,
        })
    }

    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_active_role(mut self, role: Role) -> Self {
        self.active_role = Some(role);
        self
    }
}

fn first_non_empty(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

fn push_role(roles: &mut Vec<Role>, name: &str) {
    match name.parse::<Role>() {
        Ok(role) if !roles.contains(&role) => roles.push(role),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "dropping unknown role from user metadata"),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn canonical_keys() {
        let meta = UserMetadata::from_raw(&json!({
            "version": 1,
            "roles": ["principal", "teacher"],
            "activeRole": "teacher",
            "org_id": "org-1"
        }));
        assert_eq!(meta.version, METADATA_VERSION);
        assert_eq!(meta.roles, vec![Role::Principal, Role::Teacher]);
        assert_eq!(meta.active_role, Some(Role::Teacher));
        assert_eq!(meta.org_id.as_deref(), Some("org-1"));
    }

    #[test]
    fn legacy_org_aliases_in_order() {
        let meta = UserMetadata::from_raw(&json!({ "organization_id": "org-a", "orgId": "org-b" }));
        assert_eq!(meta.org_id.as_deref(), Some("org-a"));

        let meta = UserMetadata::from_raw(&json!({ "orgId": "org-b" }));
        assert_eq!(meta.org_id.as_deref(), Some("org-b"));

        // null and blank values do not shadow a later alias
        let meta = UserMetadata::from_raw(&json!({ "org_id": null, "organization_id": "  ", "orgId": "org-c" }));
        assert_eq!(meta.org_id.as_deref(), Some("org-c"));
    }

    #[test]
    fn legacy_single_role_and_snake_case_active_role() {
        let meta = UserMetadata::from_raw(&json!({ "role": "guardian", "active_role": "parent" }));
        assert_eq!(meta.roles, vec![Role::Parent]);
        assert_eq!(meta.active_role, Some(Role::Parent));
    }

    #[test]
    #[traced_test]
    fn unknown_roles_are_dropped_with_warning() {
        let meta = UserMetadata::from_raw(&json!({ "roles": ["teacher", "janitor", "teacher"] }));
        assert_eq!(meta.roles, vec![Role::Teacher]);
        assert!(logs_contain("dropping unknown role"));
    }

    #[test]
    fn non_object_input_yields_empty_metadata() {
        assert_eq!(UserMetadata::from_raw(&Value::Null), UserMetadata::default());
        assert_eq!(UserMetadata::from_raw(&json!("org-1")), UserMetadata::default());
    }

    #[test]
    fn to_raw_reparses_to_the_same_value() {
        let meta = UserMetadata::default()
            .with_org_id("org-9")
            .with_roles([Role::Admin, Role::Parent])
            .with_active_role(Role::Parent);
        assert_eq!(UserMetadata::from_raw(&meta.to_raw()), meta);
    }
}
