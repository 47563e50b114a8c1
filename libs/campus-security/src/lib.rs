#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod context;
pub mod identity;
pub mod metadata;
pub mod role;

pub use context::{ScopeError, SecurityContext, SecurityContextBuilder};
pub use identity::{Identity, MetadataWriteError, MetadataWriter};
pub use metadata::{METADATA_VERSION, UserMetadata};
pub use role::{Role, UnknownRole};
