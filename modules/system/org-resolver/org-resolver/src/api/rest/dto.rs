use campus_security::{Role, SecurityContext};
use serde::{Deserialize, Serialize};

/// Caller's resolved access as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDto {
    pub identity_id: String,
    pub email: String,
    pub org_id: Option<String>,
    pub roles: Vec<Role>,
    pub active_role: Option<Role>,
}

impl From<&SecurityContext> for AccessDto {
    fn from(ctx: &SecurityContext) -> Self {
        Self {
            identity_id: ctx.subject_id().to_owned(),
            email: ctx.email().to_owned(),
            org_id: ctx.org_id().map(str::to_owned),
            roles: ctx.roles().to_vec(),
            active_role: ctx.active_role(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchRoleRequest {
    pub role: String,
}
