//! Public models for the attendance module.
//!
//! Transport-agnostic: dates are calendar days, identifiers are opaque
//! strings issued by the surrounding system except for the record id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn from_present(is_present: bool) -> Self {
        if is_present {
            Self::Present
        } else {
            Self::Absent
        }
    }

    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid attendance status '{0}', expected 'present' or 'absent'")]
pub struct InvalidStatus(pub String);

impl FromStr for AttendanceStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(InvalidStatus(other.to_owned())),
        }
    }
}

/// A persisted attendance entry, unique per `(student_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub org_id: String,
    pub class_id: Option<String>,
    pub student_id: String,
    pub date: Date,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Write request for one `(student_id, date)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    /// When set, must equal the caller's organization.
    pub org_id: Option<String>,
    pub class_id: Option<String>,
    pub student_id: String,
    pub date: Date,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    /// Defaults to the caller.
    pub recorded_by: Option<String>,
}

impl NewAttendance {
    #[must_use]
    pub fn new(student_id: impl Into<String>, date: Date, status: AttendanceStatus) -> Self {
        Self {
            org_id: None,
            class_id: None,
            student_id: student_id.into(),
            date,
            status,
            notes: None,
            recorded_by: None,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class_id: Option<String>) -> Self {
        self.class_id = class_id;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Filters for [`crate::AttendanceClientV1::query`]; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceQuery {
    pub class_id: Option<String>,
    pub student_id: Option<String>,
    pub date: Option<Date>,
}

impl AttendanceQuery {
    #[must_use]
    pub fn for_class(class_id: impl Into<String>, date: Date) -> Self {
        Self {
            class_id: Some(class_id.into()),
            student_id: None,
            date: Some(date),
        }
    }
}

/// Partial update of an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendancePatch {
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    pub class_id: Option<String>,
}

impl AttendancePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none() && self.class_id.is_none()
    }
}
