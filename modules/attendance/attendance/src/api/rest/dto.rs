use attendance_sdk::{
    AttendancePatch, AttendanceQuery, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::validation::{parse_day, parse_status};

/// REST DTO for one attendance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceDto {
    pub id: Uuid,
    pub org_id: String,
    pub class_id: Option<String>,
    pub student_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub recorded_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<AttendanceRecord> for AttendanceDto {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            id: r.id,
            org_id: r.org_id,
            class_id: r.class_id,
            student_id: r.student_id,
            date: r.date.to_string(),
            status: r.status,
            notes: r.notes,
            recorded_by: r.recorded_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Query string of `GET /attendance`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub class_id: Option<String>,
    pub student_id: Option<String>,
    pub date: Option<String>,
}

impl TryFrom<ListParams> for AttendanceQuery {
    type Error = DomainError;

    fn try_from(p: ListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            class_id: p.class_id.filter(|v| !v.is_empty()),
            student_id: p.student_id.filter(|v| !v.is_empty()),
            date: p
                .date
                .filter(|v| !v.is_empty())
                .map(|v| parse_day("date", &v))
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub attendance: Vec<AttendanceDto>,
    pub total: usize,
}

/// Body of `POST /attendance`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertReq {
    pub org_id: Option<String>,
    pub class_id: Option<String>,
    pub student_id: String,
    pub date: String,
    pub status: String,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

impl TryFrom<UpsertReq> for NewAttendance {
    type Error = DomainError;

    fn try_from(req: UpsertReq) -> Result<Self, Self::Error> {
        Ok(Self {
            org_id: req.org_id,
            class_id: req.class_id,
            student_id: req.student_id,
            date: parse_day("date", &req.date)?,
            status: parse_status(&req.status)?,
            notes: req.notes,
            recorded_by: req.recorded_by,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRecordReq {
    pub student_id: String,
    pub status: String,
    pub date: String,
    pub class_id: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<BatchRecordReq> for NewAttendance {
    type Error = DomainError;

    fn try_from(req: BatchRecordReq) -> Result<Self, Self::Error> {
        Ok(Self {
            org_id: None,
            class_id: req.class_id,
            student_id: req.student_id,
            date: parse_day("date", &req.date)?,
            status: parse_status(&req.status)?,
            notes: req.notes,
            recorded_by: None,
        })
    }
}

/// Body of `POST /attendance/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchReq {
    pub records: Vec<BatchRecordReq>,
}

/// Body of `PUT /attendance`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReq {
    pub id: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub class_id: Option<String>,
}

impl UpdateReq {
    /// # Errors
    /// Returns [`DomainError::Validation`] for a malformed id or status.
    pub fn into_parts(self) -> Result<(Uuid, AttendancePatch), DomainError> {
        let id = parse_id(&self.id)?;
        let patch = AttendancePatch {
            status: self.status.as_deref().map(parse_status).transpose()?,
            notes: self.notes,
            class_id: self.class_id,
        };
        Ok((id, patch))
    }
}

/// Query string of `DELETE /attendance`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteParams {
    pub id: String,
}

/// # Errors
/// Returns [`DomainError::Validation`] if `value` is not a UUID.
pub fn parse_id(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| DomainError::validation("id", format!("'{value}' is not a valid id")))
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordResponse {
    pub attendance: AttendanceDto,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub attendance: Vec<AttendanceDto>,
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
