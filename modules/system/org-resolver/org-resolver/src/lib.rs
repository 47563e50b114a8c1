//! Org Resolver Module Implementation
//!
//! The public API is defined in `org-resolver-sdk` and re-exported here.

pub use org_resolver_sdk::{
    OrgResolverClient, OrgResolverError, OrgSource, ResolveOptions, ResolvedAccess,
};

pub mod module;
pub use module::OrgResolverModule;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
