use attendance_sdk::AttendanceRecord;
use sea_orm::ActiveValue::Set;

use crate::domain::error::DomainError;
use crate::infra::storage::entity;

/// Convert a stored row to a contract model. The status column is checked
/// because the database does not constrain it.
impl TryFrom<entity::Model> for AttendanceRecord {
    type Error = DomainError;

    fn try_from(m: entity::Model) -> Result<Self, Self::Error> {
        let status = m.status.parse().map_err(|e: attendance_sdk::InvalidStatus| {
            DomainError::database(format!("row {}: {e}", m.id))
        })?;
        Ok(Self {
            id: m.id,
            org_id: m.org_id,
            class_id: m.class_id,
            student_id: m.student_id,
            date: m.date,
            status,
            notes: m.notes,
            recorded_by: m.recorded_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

#[must_use]
pub fn to_active_model(r: &AttendanceRecord) -> entity::ActiveModel {
    entity::ActiveModel {
        id: Set(r.id),
        org_id: Set(r.org_id.clone()),
        class_id: Set(r.class_id.clone()),
        student_id: Set(r.student_id.clone()),
        date: Set(r.date),
        status: Set(r.status.as_str().to_owned()),
        notes: Set(r.notes.clone()),
        recorded_by: Set(r.recorded_by.clone()),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}
