use async_trait::async_trait;
use campus_security::SecurityContext;
use uuid::Uuid;

use crate::errors::AttendanceError;
use crate::models::{AttendancePatch, AttendanceQuery, AttendanceRecord, NewAttendance};

/// Public API of the attendance store.
///
/// Every call is scoped to the organization carried by `ctx`; records of
/// other organizations are neither returned nor modified.
#[async_trait]
pub trait AttendanceClientV1: Send + Sync {
    /// Records matching every filter set in `query`.
    async fn query(
        &self,
        ctx: &SecurityContext,
        query: AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;

    /// Insert or update the record for `(student_id, date)`.
    async fn upsert_one(
        &self,
        ctx: &SecurityContext,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, AttendanceError>;

    /// Insert or update many records at once. All-or-nothing.
    async fn upsert_batch(
        &self,
        ctx: &SecurityContext,
        records: Vec<NewAttendance>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;

    async fn update(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: AttendancePatch,
    ) -> Result<AttendanceRecord, AttendanceError>;

    async fn delete(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), AttendanceError>;
}
