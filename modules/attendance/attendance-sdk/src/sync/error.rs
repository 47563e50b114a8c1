use thiserror::Error;
use time::Date;

use crate::errors::AttendanceError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("a save is already in progress")]
    SaveInFlight,

    #[error("attendance is loaded for {loaded}, not {requested}")]
    DateMismatch { loaded: Date, requested: Date },

    #[error("batch save failed: {0}")]
    Batch(#[source] AttendanceError),

    #[error("{count} of {attempted} attendance records failed to save", count = .failed.len())]
    PartialSave {
        attempted: usize,
        failed: Vec<(String, AttendanceError)>,
    },
}
