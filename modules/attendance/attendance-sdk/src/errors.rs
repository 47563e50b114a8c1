//! Error types for the attendance module.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`crate::AttendanceClientV1`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    /// Input rejected before reaching the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The record does not exist in the caller's organization.
    #[error("attendance record not found: {0}")]
    NotFound(Uuid),

    /// The request carries no organization scope.
    #[error("organization id is required")]
    MissingOrgId,

    /// The caller may not touch the record or organization.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The store could not be reached.
    #[error("attendance store unavailable: {0}")]
    Unavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AttendanceError {
    /// Whether retrying the same write, possibly split up, can succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Internal(_))
    }
}
