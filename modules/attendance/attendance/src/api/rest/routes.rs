use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Extension, Router};
use campus_auth::{AccessPolicy, Guard};
use campus_security::Role;

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Attendance routes. Every role may read and write, always inside the
/// caller's organization.
pub fn router(service: Arc<Service>, guard: &Guard) -> Router {
    let policy = AccessPolicy::org_scoped().allow_roles(Role::ALL);

    Router::new()
        .route(
            "/attendance",
            get(handlers::list_attendance)
                .post(handlers::upsert_attendance)
                .put(handlers::update_attendance)
                .delete(handlers::delete_attendance),
        )
        .route("/attendance/batch", post(handlers::upsert_attendance_batch))
        .route_layer(from_fn_with_state(guard.with_policy(policy), campus_auth::guard))
        .layer(Extension(service))
}
