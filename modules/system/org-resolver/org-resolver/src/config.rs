//! Configuration for the org resolver module.

use campus_security::Role;
use serde::{Deserialize, Serialize};

/// Module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrgResolverConfig {
    /// Organization used as a last resort, only for flows that opt into it.
    pub default_org_id: Option<String>,

    /// Role assumed when an identity carries no roles at all.
    pub baseline_role: Role,

    /// Compare the metadata organization with the persisted user record and
    /// log when they disagree.
    pub check_user_record: bool,
}

impl Default for OrgResolverConfig {
    fn default() -> Self {
        Self {
            default_org_id: None,
            baseline_role: Role::Parent,
            check_user_record: true,
        }
    }
}
