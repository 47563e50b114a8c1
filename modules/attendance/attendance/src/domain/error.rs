use attendance_sdk::AttendanceError;
use campus_security::ScopeError;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Organization ID is required")]
    MissingOrgId,

    #[error("organization '{actual}' does not match caller organization '{expected}'")]
    CrossOrg { expected: String, actual: String },

    #[error("attendance for student '{student_id}' on {date} belongs to another organization")]
    CrossOrgConflict { student_id: String, date: Date },

    #[error("{0}")]
    Forbidden(String),

    #[error("attendance record not found: {id}")]
    NotFound { id: Uuid },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<ScopeError> for DomainError {
    fn from(e: ScopeError) -> Self {
        match e {
            ScopeError::MissingOrgId => Self::MissingOrgId,
            ScopeError::CrossOrg { expected, actual } => Self::CrossOrg { expected, actual },
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::database(e.to_string())
    }
}

impl From<DomainError> for AttendanceError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::MissingOrgId => Self::MissingOrgId,
            DomainError::CrossOrg { .. }
            | DomainError::CrossOrgConflict { .. }
            | DomainError::Forbidden(_) => Self::Forbidden(e.to_string()),
            DomainError::NotFound { id } => Self::NotFound(id),
            DomainError::Validation { .. } => Self::Validation(e.to_string()),
            DomainError::Database { message } => Self::Internal(message),
        }
    }
}
