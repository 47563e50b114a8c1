use async_trait::async_trait;
use attendance_sdk::{AttendanceQuery, AttendanceRecord};
use uuid::Uuid;

use super::error::DomainError;

/// Storage port for attendance records. Every call is confined to `org_id`.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find(
        &self,
        org_id: &str,
        query: &AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, DomainError>;

    async fn get(&self, org_id: &str, id: Uuid) -> Result<Option<AttendanceRecord>, DomainError>;

    /// Insert or update by `(student_id, date)` in one transaction and return
    /// the stored rows in input order. An existing row keeps its id and
    /// `created_at`. A key held by another organization fails the whole call
    /// with [`DomainError::CrossOrgConflict`].
    async fn upsert_many(
        &self,
        org_id: &str,
        rows: Vec<AttendanceRecord>,
    ) -> Result<Vec<AttendanceRecord>, DomainError>;

    async fn update(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError>;

    /// Returns `false` when no row of `org_id` has this id.
    async fn delete(&self, org_id: &str, id: Uuid) -> Result<bool, DomainError>;
}
