//! Attendance SDK
//!
//! This crate provides the public API for the `attendance` module:
//!
//! - [`AttendanceClientV1`] - Public API trait for consumers
//! - [`AttendanceRecord`], [`NewAttendance`], [`AttendanceQuery`], [`AttendancePatch`] - Models
//! - [`AttendanceError`] - Error types
//! - [`sync::AttendanceSync`] - Client-side reconciliation of optimistic edits
//!
//! ## Usage
//!
//! ```ignore
//! use attendance_sdk::sync::{AttendanceSync, ClassRoster, Changes};
//!
//! let sync = AttendanceSync::new(client, ctx, vec![ClassRoster::new("c-1", ["s-1", "s-2"])]);
//! sync.load(date).await;
//! sync.update_attendance("s-1", true);
//! sync.save(&Changes::new(), Some(date)).await?;
//! ```

pub mod client;
pub mod errors;
pub mod models;
pub mod sync;

// Re-export main types at crate root
pub use client::AttendanceClientV1;
pub use errors::AttendanceError;
pub use models::{
    AttendancePatch, AttendanceQuery, AttendanceRecord, AttendanceStatus, InvalidStatus,
    NewAttendance,
};
