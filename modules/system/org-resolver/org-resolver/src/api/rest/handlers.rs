use std::sync::Arc;

use axum::{Json, extract::Extension};
use campus_auth::{AuthIdentity, Authz};
use campus_security::Role;

use crate::domain::service::Service;

use super::dto::{AccessDto, SwitchRoleRequest};
use super::error::ApiError;

pub async fn get_access(Authz(ctx): Authz) -> Json<AccessDto> {
    Json(AccessDto::from(&ctx))
}

pub async fn switch_active_role(
    AuthIdentity(identity): AuthIdentity,
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<SwitchRoleRequest>,
) -> Result<Json<AccessDto>, ApiError> {
    let role: Role = req
        .role
        .parse()
        .map_err(|e: campus_security::UnknownRole| ApiError::bad_request(e.to_string()))?;
    let access = svc.switch_active_role(&identity, role).await?;
    let ctx = access.to_security_context(&identity);
    Ok(Json(AccessDto::from(&ctx)))
}
