use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use axum::{Extension, Router};
use campus_auth::{AccessPolicy, Guard};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// `/me` routes. Any authenticated caller, organization optional.
pub fn router(service: Arc<Service>, guard: &Guard) -> Router {
    Router::new()
        .route("/me/access", get(handlers::get_access))
        .route("/me/active-role", put(handlers::switch_active_role))
        .route_layer(from_fn_with_state(
            guard.with_policy(AccessPolicy::authenticated()),
            campus_auth::guard,
        ))
        .layer(Extension(service))
}
