//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{ActivityEntry, TimerSnapshot};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a response that reports whether the timer is ticking
    pub fn for_timer(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.running { "running" } else { "stopped" };
        Self::new(status.to_string(), message, timer)
    }
}

/// Error body returned alongside non-2xx status codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

/// Enhanced status response with server information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: VERSION.to_string(),
        }
    }
}

/// Sound configured for a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundResponse {
    pub mode: String,
    pub sound: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundRequest {
    pub sound: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub name: String,
}

/// Result of closing an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStopResponse {
    pub stopped: Option<ActivityEntry>,
    pub timer: TimerSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitiesQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitiesResponse {
    pub days: i64,
    pub activities: Vec<ActivityEntry>,
}
