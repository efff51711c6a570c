//! Timer configuration: phase durations, stage sounds and the persisted settings document

use serde::{Deserialize, Serialize};

use super::Mode;

/// Sound played at the end of every stage unless the user picks another one
pub const DEFAULT_SOUND: &str = "https://freesound.org/data/previews/411/411089_5121236-lq.mp3";

/// Shortest duration the settings page accepts, in minutes
pub const MIN_DURATION_MINUTES: u64 = 1;

/// Longest duration the settings page accepts, in minutes (one day)
pub const MAX_DURATION_MINUTES: u64 = 24 * 60;

pub const DEFAULT_FOCUS_MINUTES: u64 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;

/// Configured phase lengths in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    pub focus: u64,
    pub short_break: u64,
    pub long_break: u64,
}

impl Durations {
    pub fn from_minutes(focus: u64, short_break: u64, long_break: u64) -> Self {
        Self {
            focus: focus.saturating_mul(60),
            short_break: short_break.saturating_mul(60),
            long_break: long_break.saturating_mul(60),
        }
    }

    /// Length of the given phase in seconds
    pub fn for_mode(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::from_minutes(
            DEFAULT_FOCUS_MINUTES,
            DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_LONG_BREAK_MINUTES,
        )
    }
}

/// Sound reference for each stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sounds {
    pub focus: String,
    pub short_break: String,
    pub long_break: String,
}

impl Sounds {
    pub fn get(&self, mode: Mode) -> &str {
        match mode {
            Mode::Focus => &self.focus,
            Mode::ShortBreak => &self.short_break,
            Mode::LongBreak => &self.long_break,
        }
    }

    pub fn set(&mut self, mode: Mode, sound: String) {
        match mode {
            Mode::Focus => self.focus = sound,
            Mode::ShortBreak => self.short_break = sound,
            Mode::LongBreak => self.long_break = sound,
        }
    }
}

impl Default for Sounds {
    fn default() -> Self {
        Self {
            focus: DEFAULT_SOUND.to_string(),
            short_break: DEFAULT_SOUND.to_string(),
            long_break: DEFAULT_SOUND.to_string(),
        }
    }
}

/// Per-user settings as stored by the settings API. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub focus_duration: u64,
    pub short_break_duration: u64,
    pub long_break_duration: u64,
    pub focus_sound: String,
    pub short_break_sound: String,
    pub long_break_sound: String,
}

impl Settings {
    pub fn durations(&self) -> Durations {
        Durations::from_minutes(
            self.focus_duration,
            self.short_break_duration,
            self.long_break_duration,
        )
    }

    pub fn sounds(&self) -> Sounds {
        Sounds {
            focus: self.focus_sound.clone(),
            short_break: self.short_break_sound.clone(),
            long_break: self.long_break_sound.clone(),
        }
    }

    /// Reject durations shorter than one minute or longer than one day
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("focusDuration", self.focus_duration),
            ("shortBreakDuration", self.short_break_duration),
            ("longBreakDuration", self.long_break_duration),
        ];
        for (name, minutes) in fields {
            if minutes < MIN_DURATION_MINUTES {
                return Err(format!(
                    "{} must be at least {} minute(s), got {}",
                    name, MIN_DURATION_MINUTES, minutes
                ));
            }
            if minutes > MAX_DURATION_MINUTES {
                return Err(format!(
                    "{} must be at most {} minutes, got {}",
                    name, MAX_DURATION_MINUTES, minutes
                ));
            }
        }
        Ok(())
    }

    /// Overlay the fields present in `patch`
    pub fn merge(mut self, patch: SettingsPatch) -> Self {
        if let Some(v) = patch.focus_duration {
            self.focus_duration = v;
        }
        if let Some(v) = patch.short_break_duration {
            self.short_break_duration = v;
        }
        if let Some(v) = patch.long_break_duration {
            self.long_break_duration = v;
        }
        if let Some(v) = patch.focus_sound {
            self.focus_sound = v;
        }
        if let Some(v) = patch.short_break_sound {
            self.short_break_sound = v;
        }
        if let Some(v) = patch.long_break_sound {
            self.long_break_sound = v;
        }
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: DEFAULT_FOCUS_MINUTES,
            short_break_duration: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_duration: DEFAULT_LONG_BREAK_MINUTES,
            focus_sound: DEFAULT_SOUND.to_string(),
            short_break_sound: DEFAULT_SOUND.to_string(),
            long_break_sound: DEFAULT_SOUND.to_string(),
        }
    }
}

/// Partial settings body accepted by the upsert endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub focus_duration: Option<u64>,
    pub short_break_duration: Option<u64>,
    pub long_break_duration: Option<u64>,
    pub focus_sound: Option<String>,
    pub short_break_sound: Option<String>,
    pub long_break_sound: Option<String>,
}

/// Settings together with the owning user, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub user_id: String,
    #[serde(flatten)]
    pub settings: Settings,
}
