use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use attendance_sdk::{AttendancePatch, AttendanceQuery, AttendanceRecord, NewAttendance};
use campus_security::{Role, SecurityContext};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::AttendanceConfig;
use crate::domain::error::DomainError;
use crate::domain::repo::AttendanceRepository;
use crate::domain::validation;

/// Org-scoped attendance operations.
///
/// The organization always comes from the caller's [`SecurityContext`]; a
/// record never crosses into another organization.
pub struct Service {
    repo: Arc<dyn AttendanceRepository>,
    config: AttendanceConfig,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn AttendanceRepository>, config: AttendanceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(skip(self, ctx), fields(org_id = ctx.org_id()))]
    pub async fn list(
        &self,
        ctx: &SecurityContext,
        query: AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let org_id = ctx.require_org()?;
        let records = self.repo.find(org_id, &query).await?;
        for record in &records {
            ctx.ensure_same_org(&record.org_id)?;
        }
        debug!(count = records.len(), "attendance listed");
        Ok(records)
    }

    #[instrument(
        skip(self, ctx, record),
        fields(org_id = ctx.org_id(), student_id = %record.student_id, date = %record.date)
    )]
    pub async fn upsert_one(
        &self,
        ctx: &SecurityContext,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, DomainError> {
        let org_id = ctx.require_org()?;
        let row = prepare(ctx, org_id, record, OffsetDateTime::now_utc())?;

        let saved = self
            .repo
            .upsert_many(org_id, vec![row])
            .await?
            .pop()
            .ok_or_else(|| DomainError::database("upsert returned no row"))?;
        info!(id = %saved.id, status = %saved.status, "attendance saved");
        Ok(saved)
    }

    /// Upsert many records in one transaction. Repeated `(student_id, date)`
    /// keys collapse to the last one given.
    #[instrument(skip(self, ctx, records), fields(org_id = ctx.org_id(), count = records.len()))]
    pub async fn upsert_batch(
        &self,
        ctx: &SecurityContext,
        records: Vec<NewAttendance>,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let org_id = ctx.require_org()?;
        if records.is_empty() {
            return Err(DomainError::validation(
                "records",
                "at least one record is required",
            ));
        }
        if records.len() > self.config.max_batch_size {
            return Err(DomainError::validation(
                "records",
                format!("at most {} records per batch", self.config.max_batch_size),
            ));
        }

        let now = OffsetDateTime::now_utc();
        let rows = records
            .into_iter()
            .map(|record| prepare(ctx, org_id, record, now))
            .collect::<Result<Vec<_>, _>>()?;

        let saved = self.repo.upsert_many(org_id, last_per_key(rows)).await?;
        info!(saved = saved.len(), "attendance batch saved");
        Ok(saved)
    }

    /// Apply `patch` to a record of the caller's organization. Blank `notes`
    /// or `class_id` clear the field.
    #[instrument(skip(self, ctx, patch), fields(org_id = ctx.org_id(), %id))]
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: AttendancePatch,
    ) -> Result<AttendanceRecord, DomainError> {
        let org_id = ctx.require_org()?;
        if patch.is_empty() {
            return Err(DomainError::validation("body", "nothing to update"));
        }

        let mut record = self
            .repo
            .get(org_id, id)
            .await?
            .ok_or(DomainError::NotFound { id })?;
        ctx.ensure_same_org(&record.org_id)?;

        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(notes) = patch.notes {
            record.notes = validation::non_blank(Some(notes));
        }
        if let Some(class_id) = patch.class_id {
            record.class_id = validation::non_blank(Some(class_id));
        }
        record.updated_at = OffsetDateTime::now_utc();

        let updated = self.repo.update(&record).await?;
        info!(status = %updated.status, "attendance updated");
        Ok(updated)
    }

    #[instrument(skip(self, ctx), fields(org_id = ctx.org_id(), %id))]
    pub async fn delete(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        let org_id = ctx.require_org()?;
        if !self.repo.delete(org_id, id).await? {
            return Err(DomainError::NotFound { id });
        }
        info!("attendance deleted");
        Ok(())
    }
}

/// Validate a write and stamp it with the caller's organization.
fn prepare(
    ctx: &SecurityContext,
    org_id: &str,
    record: NewAttendance,
    now: OffsetDateTime,
) -> Result<AttendanceRecord, DomainError> {
    if let Some(claimed) = validation::non_blank(record.org_id) {
        ctx.ensure_same_org(&claimed)?;
    }

    Ok(AttendanceRecord {
        id: Uuid::now_v7(),
        org_id: org_id.to_owned(),
        class_id: validation::non_blank(record.class_id),
        student_id: validation::student_id(&record.student_id)?,
        date: record.date,
        status: record.status,
        notes: validation::non_blank(record.notes),
        recorded_by: recorded_by(ctx, record.recorded_by)?,
        created_at: now,
        updated_at: now,
    })
}

/// Only admins and principals may record on behalf of someone else.
fn recorded_by(ctx: &SecurityContext, requested: Option<String>) -> Result<String, DomainError> {
    match validation::non_blank(requested) {
        None => Ok(ctx.subject_id().to_owned()),
        Some(who)
            if who == ctx.subject_id() || ctx.active_role().is_some_and(Role::is_staff_admin) =>
        {
            Ok(who)
        }
        Some(who) => Err(DomainError::Forbidden(format!(
            "cannot record attendance on behalf of '{who}'"
        ))),
    }
}

fn last_per_key(rows: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
    let mut slots: HashMap<(String, Date), usize> = HashMap::with_capacity(rows.len());
    let mut unique: Vec<AttendanceRecord> = Vec::with_capacity(rows.len());
    for row in rows {
        match slots.entry((row.student_id.clone(), row.date)) {
            Entry::Occupied(slot) => unique[*slot.get()] = row,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(row);
            }
        }
    }
    unique
}
