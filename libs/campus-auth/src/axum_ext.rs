//! Axum extractors and middleware for auth

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use campus_security::{Identity, SecurityContext};

use crate::authorizer::{Authorized, Guard};
use crate::errors::AuthError;
use crate::policy::AccessPolicy;

/// Extractor for `SecurityContext` - validates that the guard has run
#[derive(Debug, Clone)]
pub struct Authz(pub SecurityContext);

impl<S> FromRequestParts<S> for Authz
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(Authz)
            .ok_or(AuthError::Internal(
                "SecurityContext not found - guard middleware not configured".to_owned(),
            ))
    }
}

/// Extractor for an org-scoped `SecurityContext`; the organization id is
/// guaranteed to be present and non-empty.
#[derive(Debug, Clone)]
pub struct OrgScoped {
    pub ctx: SecurityContext,
    pub org_id: String,
}

impl<S> FromRequestParts<S> for OrgScoped
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authz(ctx) = Authz::from_request_parts(parts, state).await?;
        let org_id = ctx.org_id().ok_or(AuthError::MissingOrgId)?.to_owned();
        Ok(OrgScoped { ctx, org_id })
    }
}

/// Extractor for the authenticated `Identity` - validates that the guard has run
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub Identity);

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthIdentity)
            .ok_or(AuthError::Internal(
                "Identity not found - guard middleware not configured".to_owned(),
            ))
    }
}

#[derive(Clone)]
pub struct GuardState {
    guard: Guard,
    policy: Arc<AccessPolicy>,
}

impl GuardState {
    #[must_use]
    pub fn new(guard: Guard, policy: AccessPolicy) -> Self {
        Self {
            guard,
            policy: Arc::new(policy),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }
}

/// Guard middleware, used with `axum::middleware::from_fn_with_state`.
///
/// Skips CORS preflight requests. Otherwise the request only reaches the
/// handler once [`Guard::authorize`] succeeds; the identity and security
/// context are then available through [`AuthIdentity`], [`Authz`] and
/// [`OrgScoped`].
pub async fn guard(
    State(GuardState { guard, policy }): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    match guard.authorize(request.headers(), &policy).await {
        Ok(Authorized { identity, ctx, .. }) => {
            request.extensions_mut().insert(identity);
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}

// Note: tests for the guard live in tests/guard_integration.rs
