//! Org Resolver SDK
//!
//! This crate provides the public API for the `org-resolver` module:
//!
//! - [`OrgResolverClient`] - Public API trait for consumers
//! - [`ResolveOptions`], [`ResolvedAccess`], [`OrgSource`] - Models
//! - [`OrgResolverError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use org_resolver_sdk::{OrgResolverClient, ResolveOptions};
//!
//! let access = resolver.resolve(&identity, &ResolveOptions::required()).await?;
//! let ctx = access.to_security_context(&identity);
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::OrgResolverClient;
pub use error::OrgResolverError;
pub use models::{OrgSource, ResolveOptions, ResolvedAccess};
