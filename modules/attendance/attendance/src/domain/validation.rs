//! Input checks shared by the REST layer and the service.

use attendance_sdk::{AttendanceStatus, InvalidStatus};
use time::Date;
use time::macros::format_description;

use super::error::DomainError;

/// Parse a `YYYY-MM-DD` calendar day.
///
/// # Errors
/// Returns [`DomainError::Validation`] naming `field` if the value is not a valid day.
pub fn parse_day(field: &str, value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        DomainError::validation(field, format!("'{value}' is not a date in YYYY-MM-DD form"))
    })
}

/// # Errors
/// Returns [`DomainError::Validation`] for anything but `present` or `absent`.
pub fn parse_status(value: &str) -> Result<AttendanceStatus, DomainError> {
    value
        .parse()
        .map_err(|e: InvalidStatus| DomainError::validation("status", e.to_string()))
}

/// # Errors
/// Returns [`DomainError::Validation`] for a blank student id.
pub fn student_id(value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("student_id", "must not be empty"));
    }
    Ok(trimmed.to_owned())
}

/// Blank optional text is stored as absent.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
