use campus_security::{MetadataWriteError, Role};
use org_resolver_sdk::OrgResolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("organization id is missing for identity '{identity_id}'")]
    MissingOrgId { identity_id: String },

    #[error("role '{role}' is not held by this user")]
    RoleNotHeld { role: Role },

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("metadata write failed: {0}")]
    Metadata(String),

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::database(e.to_string())
    }
}

impl From<MetadataWriteError> for DomainError {
    fn from(e: MetadataWriteError) -> Self {
        match e {
            MetadataWriteError::IdentityNotFound(id) => Self::IdentityNotFound(id),
            MetadataWriteError::Store(msg) => Self::Metadata(msg),
        }
    }
}

impl From<DomainError> for OrgResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::MissingOrgId { identity_id } => Self::MissingOrgId { identity_id },
            DomainError::RoleNotHeld { role } => Self::RoleNotHeld { role },
            DomainError::IdentityNotFound(id) => Self::IdentityNotFound(id),
            DomainError::Metadata(msg) | DomainError::Database { message: msg } => {
                Self::Internal(msg)
            }
        }
    }
}
