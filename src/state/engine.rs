//! Pomodoro timer engine
//!
//! A pure state machine: it never sleeps or spawns. Something else calls
//! [`TimerEngine::tick`] once per second while [`TimerEngine::is_running`]
//! is true, and reacts to the phase it returns.

use chrono::{DateTime, Duration, Utc};

use super::{
    ActivityEntry, ActivityInfo, Durations, Mode, RemainingTime, Sounds, TimerSnapshot,
};

/// Every n-th break (counting from the first) is a long one
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// Default look-back window for the activity list
pub const DEFAULT_ACTIVITY_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: Mode,
    durations: Durations,
    time_remaining: u64,
    focus_time_remaining: u64,
    running: bool,
    session_count: u32,
    sounds: Sounds,
    activity: Option<ActivityInfo>,
    activity_log: Vec<ActivityEntry>,
}

impl TimerEngine {
    /// Create a stopped engine at the start of a focus phase
    pub fn new(durations: Durations) -> Self {
        Self {
            mode: Mode::Focus,
            durations,
            time_remaining: durations.focus,
            focus_time_remaining: durations.focus,
            running: false,
            session_count: 0,
            sounds: Sounds::default(),
            activity: None,
            activity_log: Vec::new(),
        }
    }

    /// Returns false if the engine was already running
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Returns false if the engine was already stopped
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    pub fn reset(&mut self) {
        self.stop();
        self.mode = Mode::Focus;
        self.time_remaining = self.durations.focus;
        self.focus_time_remaining = self.durations.focus;
        if let Some(activity) = self.activity.as_mut() {
            activity.time_elapsed = 0;
        }
        self.session_count = 0;
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the phase entered when this tick finished the current one.
    pub fn tick(&mut self) -> Option<Mode> {
        if !self.running {
            return None;
        }

        if self.time_remaining > 0 {
            self.time_remaining -= 1;
            if self.mode == Mode::Focus {
                self.focus_time_remaining = self.time_remaining;
                if let Some(activity) = self.activity.as_mut() {
                    activity.time_elapsed += 1;
                }
            }
        }

        if self.time_remaining == 0 {
            Some(self.advance_phase())
        } else {
            None
        }
    }

    /// Move to the next phase and keep running. Returns the phase entered.
    pub fn advance_phase(&mut self) -> Mode {
        self.stop();

        if self.mode == Mode::Focus {
            // A finished focus phase leaves nothing to resume.
            if self.focus_time_remaining == 0 {
                self.focus_time_remaining = self.durations.focus;
            }
            self.mode = if self.session_count % LONG_BREAK_INTERVAL == 0 {
                Mode::LongBreak
            } else {
                Mode::ShortBreak
            };
            self.time_remaining = self.durations.for_mode(self.mode);
        } else {
            self.mode = Mode::Focus;
            self.time_remaining = self.focus_time_remaining;
            self.session_count += 1;
        }

        self.start();
        self.mode
    }

    /// End the current phase early
    pub fn skip(&mut self) -> Mode {
        self.advance_phase()
    }

    /// Replace the configured durations. The active phase is retargeted
    /// only when its own duration changed.
    pub fn configure_durations(&mut self, durations: Durations) {
        let previous = self.durations.for_mode(self.mode);
        self.durations = durations;

        let current = durations.for_mode(self.mode);
        if current != previous {
            self.time_remaining = current;
            if self.mode == Mode::Focus {
                self.focus_time_remaining = current;
            }
        }
    }

    pub fn set_sound(&mut self, mode: Mode, sound: impl Into<String>) {
        self.sounds.set(mode, sound.into());
    }

    pub fn sound(&self, mode: Mode) -> &str {
        self.sounds.get(mode)
    }

    /// Set a sound by its wire name. Unknown names are ignored.
    pub fn set_sound_by_key(&mut self, key: &str, sound: impl Into<String>) -> bool {
        match key.parse::<Mode>() {
            Ok(mode) => {
                self.set_sound(mode, sound);
                true
            }
            Err(_) => false,
        }
    }

    /// Sound for a wire name, or an empty string for unknown names
    pub fn sound_by_key(&self, key: &str) -> &str {
        key.parse::<Mode>().map(|mode| self.sound(mode)).unwrap_or("")
    }

    pub fn set_sounds(&mut self, sounds: Sounds) {
        self.sounds = sounds;
    }

    pub fn start_activity(&mut self, name: impl Into<String>) {
        self.start_activity_at(name, Utc::now());
    }

    /// Start tracking an activity that began at `started_at`.
    ///
    /// Outside a focus phase the countdown is reloaded with the focus
    /// duration; the mode itself is left alone.
    pub fn start_activity_at(&mut self, name: impl Into<String>, started_at: DateTime<Utc>) {
        if self.mode != Mode::Focus {
            self.time_remaining = self.durations.focus;
        }
        self.stop_activity();

        let name = name.into();
        self.activity_log.push(ActivityEntry {
            name: name.clone(),
            started_at,
            duration: 0,
        });
        self.activity = Some(ActivityInfo::new(name));
    }

    /// Close the open activity, if any, and return its log entry
    pub fn stop_activity(&mut self) -> Option<&ActivityEntry> {
        let activity = self.activity.take()?;
        let entry = self.activity_log.last_mut()?;
        entry.duration = activity.time_elapsed;
        Some(entry)
    }

    /// Entries started within the last `days_ago` days
    pub fn activities(&self, days_ago: i64) -> impl Iterator<Item = &ActivityEntry> + '_ {
        self.activities_at(days_ago, Utc::now())
    }

    pub fn activities_at(
        &self,
        days_ago: i64,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &ActivityEntry> + '_ {
        let cutoff = now - Duration::days(days_ago);
        self.activity_log
            .iter()
            .filter(move |entry| entry.started_at >= cutoff)
    }

    pub fn activity_log(&self) -> &[ActivityEntry] {
        &self.activity_log
    }

    pub fn activity_info(&self) -> ActivityInfo {
        self.activity.clone().unwrap_or_else(ActivityInfo::none)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time_remaining(&self) -> RemainingTime {
        RemainingTime::from_secs(self.time_remaining)
    }

    pub fn time_remaining_secs(&self) -> u64 {
        self.time_remaining
    }

    pub fn focus_time_remaining(&self) -> u64 {
        self.focus_time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn sounds(&self) -> &Sounds {
        &self.sounds
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            running: self.running,
            time_remaining: self.time_remaining(),
            time_remaining_seconds: self.time_remaining,
            focus_time_remaining: self.focus_time_remaining,
            session_count: self.session_count,
            durations: self.durations,
            activity: self.activity_info(),
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}
