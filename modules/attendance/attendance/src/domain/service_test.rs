#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use attendance_sdk::{
    AttendancePatch, AttendanceQuery, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use campus_security::{Role, SecurityContext};
use time::macros::date;
use uuid::Uuid;

use super::error::DomainError;
use super::repo::AttendanceRepository;
use super::service::Service;
use crate::config::AttendanceConfig;

#[derive(Default)]
struct MemoryRepo {
    rows: Mutex<Vec<AttendanceRecord>>,
    /// Return every row from `find`, ignoring the organization filter.
    leaky: bool,
}

#[async_trait]
impl AttendanceRepository for MemoryRepo {
    async fn find(
        &self,
        org_id: &str,
        query: &AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| self.leaky || r.org_id == org_id)
            .filter(|r| query.student_id.as_ref().is_none_or(|s| *s == r.student_id))
            .filter(|r| query.date.is_none_or(|d| d == r.date))
            .cloned()
            .collect())
    }

    async fn get(&self, org_id: &str, id: Uuid) -> Result<Option<AttendanceRecord>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.id == id && r.org_id == org_id)
            .cloned())
    }

    async fn upsert_many(
        &self,
        org_id: &str,
        incoming: Vec<AttendanceRecord>,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let mut saved = Vec::new();
        for row in incoming {
            match rows
                .iter_mut()
                .find(|r| r.student_id == row.student_id && r.date == row.date)
            {
                Some(existing) if existing.org_id != org_id => {
                    return Err(DomainError::CrossOrgConflict {
                        student_id: row.student_id,
                        date: row.date,
                    });
                }
                Some(existing) => {
                    existing.status = row.status;
                    existing.notes = row.notes;
                    existing.class_id = row.class_id;
                    existing.recorded_by = row.recorded_by;
                    existing.updated_at = row.updated_at;
                    saved.push(existing.clone());
                }
                None => {
                    rows.push(row.clone());
                    saved.push(row);
                }
            }
        }
        Ok(saved)
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(DomainError::NotFound { id: record.id })?;
        *existing = record.clone();
        Ok(record.clone())
    }

    async fn delete(&self, org_id: &str, id: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.org_id == org_id));
        Ok(rows.len() != before)
    }
}

fn ctx(subject: &str, org: Option<&str>, role: Role) -> SecurityContext {
    SecurityContext::builder()
        .subject_id(subject)
        .email("someone@school.test")
        .org_id(org.map(str::to_owned))
        .roles(&[role])
        .active_role(role)
        .build()
}

fn teacher() -> SecurityContext {
    ctx("teacher-1", Some("org-1"), Role::Teacher)
}

fn service(repo: Arc<MemoryRepo>) -> Service {
    Service::new(repo, AttendanceConfig { max_batch_size: 3 })
}

fn mark(student: &str, status: AttendanceStatus) -> NewAttendance {
    NewAttendance::new(student, date!(2024 - 01 - 10), status)
}

#[tokio::test]
async fn upsert_is_stamped_with_caller_org_and_recorder() {
    let repo = Arc::new(MemoryRepo::default());
    let svc = service(repo.clone());

    let saved = svc
        .upsert_one(&teacher(), mark("S1", AttendanceStatus::Present))
        .await
        .unwrap();

    assert_eq!(saved.org_id, "org-1");
    assert_eq!(saved.recorded_by, "teacher-1");
    assert_eq!(repo.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn second_upsert_updates_the_same_row() {
    let repo = Arc::new(MemoryRepo::default());
    let svc = service(repo.clone());

    let first = svc
        .upsert_one(&teacher(), mark("S1", AttendanceStatus::Present))
        .await
        .unwrap();
    let second = svc
        .upsert_one(&teacher(), mark("S1", AttendanceStatus::Absent))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let rows = repo.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, AttendanceStatus::Absent);
}

#[tokio::test]
async fn body_org_must_match_caller_org() {
    let svc = service(Arc::new(MemoryRepo::default()));
    let mut record = mark("S1", AttendanceStatus::Present);
    record.org_id = Some("org-2".to_owned());

    let err = svc.upsert_one(&teacher(), record).await.unwrap_err();

    assert!(matches!(err, DomainError::CrossOrg { ref actual, .. } if actual == "org-2"));
}

#[tokio::test]
async fn recording_for_someone_else_needs_staff_admin() {
    let svc = service(Arc::new(MemoryRepo::default()));
    let mut record = mark("S1", AttendanceStatus::Present);
    record.recorded_by = Some("teacher-2".to_owned());

    let err = svc
        .upsert_one(&teacher(), record.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let principal = ctx("principal-1", Some("org-1"), Role::Principal);
    let saved = svc.upsert_one(&principal, record).await.unwrap();
    assert_eq!(saved.recorded_by, "teacher-2");
}

#[tokio::test]
async fn unscoped_caller_is_rejected() {
    let svc = service(Arc::new(MemoryRepo::default()));
    let caller = ctx("teacher-1", None, Role::Teacher);

    let err = svc
        .list(&caller, AttendanceQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::MissingOrgId));
}

#[tokio::test]
async fn batch_bounds_are_enforced() {
    let svc = service(Arc::new(MemoryRepo::default()));

    let err = svc.upsert_batch(&teacher(), Vec::new()).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "records"));

    let too_many = ["S1", "S2", "S3", "S4"]
        .iter()
        .map(|s| mark(s, AttendanceStatus::Present))
        .collect();
    let err = svc.upsert_batch(&teacher(), too_many).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn batch_keeps_last_entry_per_student_and_day() {
    let repo = Arc::new(MemoryRepo::default());
    let svc = service(repo.clone());

    let saved = svc
        .upsert_batch(
            &teacher(),
            vec![
                mark("S1", AttendanceStatus::Present),
                mark("S2", AttendanceStatus::Present),
                mark("S1", AttendanceStatus::Absent),
            ],
        )
        .await
        .unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].student_id, "S1");
    assert_eq!(saved[0].status, AttendanceStatus::Absent);
    assert_eq!(repo.rows.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn batch_with_blank_student_writes_nothing() {
    let repo = Arc::new(MemoryRepo::default());
    let svc = service(repo.clone());

    let err = svc
        .upsert_batch(
            &teacher(),
            vec![
                mark("S1", AttendanceStatus::Present),
                mark("  ", AttendanceStatus::Present),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "student_id"));
    assert!(repo.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_and_delete_stay_inside_the_org() {
    let repo = Arc::new(MemoryRepo::default());
    let svc = service(repo.clone());
    let saved = svc
        .upsert_one(&teacher(), mark("S1", AttendanceStatus::Present))
        .await
        .unwrap();
    let outsider = ctx("teacher-9", Some("org-9"), Role::Teacher);
    let patch = AttendancePatch {
        status: Some(AttendanceStatus::Absent),
        notes: Some("sick".to_owned()),
        class_id: None,
    };

    let err = svc
        .update(&outsider, saved.id, patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { id } if id == saved.id));
    let err = svc.delete(&outsider, saved.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let updated = svc.update(&teacher(), saved.id, patch).await.unwrap();
    assert_eq!(updated.status, AttendanceStatus::Absent);
    assert_eq!(updated.notes.as_deref(), Some("sick"));

    svc.delete(&teacher(), saved.id).await.unwrap();
    assert!(repo.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let svc = service(Arc::new(MemoryRepo::default()));

    let err = svc
        .update(&teacher(), Uuid::now_v7(), AttendancePatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn foreign_rows_from_the_store_fail_the_read() {
    let repo = Arc::new(MemoryRepo {
        leaky: true,
        ..MemoryRepo::default()
    });
    let svc = service(repo);
    let other = ctx("teacher-9", Some("org-9"), Role::Teacher);
    svc.upsert_one(&other, mark("S9", AttendanceStatus::Present))
        .await
        .unwrap();

    let err = svc
        .list(&teacher(), AttendanceQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::CrossOrg { .. }));
}

#[tokio::test]
async fn same_student_and_day_in_another_org_conflicts() {
    let repo = Arc::new(MemoryRepo::default());
    let svc = service(repo.clone());
    let other = ctx("teacher-9", Some("org-9"), Role::Teacher);
    svc.upsert_one(&other, mark("S1", AttendanceStatus::Present))
        .await
        .unwrap();

    let err = svc
        .upsert_one(&teacher(), mark("S1", AttendanceStatus::Absent))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::CrossOrgConflict { .. }));
    assert_eq!(repo.rows.lock().unwrap()[0].status, AttendanceStatus::Present);
}
