#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request authorization for campus HTTP services.
//!
//! A request passes through four stages: the bearer token is turned into an
//! [`campus_security::Identity`] by an [`IdentityProvider`], the identity is
//! scoped to an organization by the org resolver, the caller's role is
//! checked against the route's [`AccessPolicy`], and finally a
//! [`campus_security::SecurityContext`] is handed to the handler through the
//! [`Authz`] or [`OrgScoped`] extractors.

pub mod authorizer;
pub mod axum_ext;
pub mod errors;
pub mod policy;
pub mod provider;
pub mod static_provider;

pub use authorizer::{Authorized, Guard, GuardStage};
pub use axum_ext::{AuthIdentity, Authz, GuardState, OrgScoped, guard};
pub use errors::AuthError;
pub use policy::{AccessPolicy, RoleMatch};
pub use provider::{IdentityProvider, extract_bearer_token};
pub use static_provider::{StaticAuthConfig, StaticIdentity, StaticIdentityProvider};
