use serde::{Deserialize, Serialize};

/// Configuration for the attendance module
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttendanceConfig {
    /// Largest number of records accepted by one batch upsert.
    pub max_batch_size: usize,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 500,
        }
    }
}
