//! Client-side attendance reconciliation.
//!
//! A roll-call screen toggles checkboxes optimistically. [`AttendanceSync`]
//! keeps those edits (`attendance`) next to what the store is known to hold
//! (`saved_attendance`), writes only the difference, and prefers one batch
//! write, falling back to per-record writes when the batch fails transiently.

mod engine;
mod error;
mod roster;
mod state;

pub use engine::{AttendanceSnapshot, AttendanceSync, LoadReport, SavePath, SaveReport};
pub use error::SyncError;
pub use roster::ClassRoster;
pub use state::{AttendanceState, Changes};
