//! Local (in-process) client for the attendance module.

use std::sync::Arc;

use async_trait::async_trait;
use attendance_sdk::{
    AttendanceClientV1, AttendanceError, AttendancePatch, AttendanceQuery, AttendanceRecord,
    NewAttendance,
};
use campus_security::SecurityContext;
use uuid::Uuid;

use super::{DomainError, Service};

/// Local client wrapping the attendance service.
pub struct AttendanceLocalClient {
    svc: Arc<Service>,
}

impl AttendanceLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AttendanceError {
    match &e {
        DomainError::Database { .. } => {
            tracing::error!(operation = op, error = ?e, "attendance call failed");
        }
        _ => tracing::debug!(operation = op, error = %e, "attendance call rejected"),
    }
    e.into()
}

#[async_trait]
impl AttendanceClientV1 for AttendanceLocalClient {
    async fn query(
        &self,
        ctx: &SecurityContext,
        query: AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        self.svc
            .list(ctx, query)
            .await
            .map_err(|e| log_and_convert("query", e))
    }

    async fn upsert_one(
        &self,
        ctx: &SecurityContext,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.svc
            .upsert_one(ctx, record)
            .await
            .map_err(|e| log_and_convert("upsert_one", e))
    }

    async fn upsert_batch(
        &self,
        ctx: &SecurityContext,
        records: Vec<NewAttendance>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        self.svc
            .upsert_batch(ctx, records)
            .await
            .map_err(|e| log_and_convert("upsert_batch", e))
    }

    async fn update(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: AttendancePatch,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.svc
            .update(ctx, id, patch)
            .await
            .map_err(|e| log_and_convert("update", e))
    }

    async fn delete(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), AttendanceError> {
        self.svc
            .delete(ctx, id)
            .await
            .map_err(|e| log_and_convert("delete", e))
    }
}
