//! Activity tracking types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged activity. `duration` stays 0 until the activity is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub name: String,
    #[serde(rename = "date")]
    pub started_at: DateTime<Utc>,
    pub duration: u64,
}

/// Activity currently being timed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInfo {
    pub name: String,
    pub time_elapsed: u64,
}

impl ActivityInfo {
    pub fn new(name: String) -> Self {
        Self {
            name,
            time_elapsed: 0,
        }
    }

    /// Empty name and zero elapsed time when nothing is tracked
    pub fn none() -> Self {
        Self::default()
    }
}
