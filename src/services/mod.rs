//! External service management module
//!
//! This module contains the settings persistence backends the timer reads
//! its per-user configuration from.

pub mod settings_store;

// Re-export main types
pub use settings_store::{JsonFileSettingsStore, MemorySettingsStore, SettingsStore};
