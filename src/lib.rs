//! Pomodoro Server - A Pomodoro timer with activity tracking
//!
//! This library provides the timer engine that cycles between focus and
//! break phases, the per-activity time log, and an HTTP API for controlling
//! the timer and persisting per-user settings.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Mode, TimerEngine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
