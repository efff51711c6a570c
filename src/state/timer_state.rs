//! Read models published by the timer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityInfo, Durations, Mode};

/// Remaining time split for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub minutes: u64,
    pub seconds: u64,
}

impl RemainingTime {
    pub fn from_secs(total: u64) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }
}

/// Consistent view of the engine taken under a single lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub running: bool,
    pub time_remaining: RemainingTime,
    pub time_remaining_seconds: u64,
    pub focus_time_remaining: u64,
    pub session_count: u32,
    pub durations: Durations,
    pub activity: ActivityInfo,
}

/// Emitted once for every phase boundary the timer crosses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    /// Phase being entered
    pub mode: Mode,
    /// Sound the UI should play for the new phase
    pub sound: String,
    pub session_count: u32,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_time_splits_minutes_and_seconds() {
        assert_eq!(RemainingTime::from_secs(1500), RemainingTime { minutes: 25, seconds: 0 });
        assert_eq!(RemainingTime::from_secs(61), RemainingTime { minutes: 1, seconds: 1 });
        assert_eq!(RemainingTime::from_secs(0), RemainingTime { minutes: 0, seconds: 0 });
    }
}
