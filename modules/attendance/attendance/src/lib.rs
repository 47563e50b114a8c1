//! Attendance Module Implementation
//!
//! The public API is defined in `attendance-sdk` and re-exported here.

pub use attendance_sdk::{
    AttendanceClientV1, AttendanceError, AttendancePatch, AttendanceQuery, AttendanceRecord,
    AttendanceStatus, NewAttendance,
};

pub mod module;
pub use module::AttendanceModule;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
