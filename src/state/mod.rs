//! State management module
//!
//! This module contains the timer engine, its configuration types and the
//! shared application state that drives it.

pub mod activity;
pub mod app_state;
pub mod engine;
pub mod mode;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use activity::{ActivityEntry, ActivityInfo};
pub use app_state::{AppState, SaveSettingsError};
pub use engine::{TimerEngine, DEFAULT_ACTIVITY_DAYS, LONG_BREAK_INTERVAL};
pub use mode::Mode;
pub use settings::{
    Durations, Settings, SettingsDocument, SettingsPatch, Sounds, DEFAULT_SOUND,
};
pub use timer_state::{RemainingTime, StageEvent, TimerSnapshot};
