//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::services::SettingsStore;
use super::{
    ActivityEntry, Durations, Mode, Settings, SettingsDocument, SettingsPatch, StageEvent,
    TimerEngine, TimerSnapshot,
};

/// Main application state that owns the timer engine and the settings store
pub struct AppState {
    /// The one timer engine driven by the ticker task
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Per-user settings persistence
    pub settings_store: Arc<dyn SettingsStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Running flag watched by the ticker task
    pub running_tx: watch::Sender<bool>,
    /// Stage-complete notifications
    pub stage_tx: broadcast::Sender<StageEvent>,
}

impl AppState {
    /// Create a new AppState with a stopped engine
    pub fn new(port: u16, host: String, settings_store: Arc<dyn SettingsStore>) -> Self {
        Self::with_engine(port, host, settings_store, TimerEngine::default())
    }

    pub fn with_engine(
        port: u16,
        host: String,
        settings_store: Arc<dyn SettingsStore>,
        engine: TimerEngine,
    ) -> Self {
        let (running_tx, _) = watch::channel(engine.is_running());
        let (stage_tx, _) = broadcast::channel(100);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            settings_store,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            running_tx,
            stage_tx,
        }
    }

    /// Apply a command to the engine, record it and publish the running flag
    pub fn update_engine<F, R>(&self, action: &str, updater: F) -> Result<(R, TimerSnapshot), String>
    where
        F: FnOnce(&mut TimerEngine) -> R,
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        let result = updater(&mut *engine);
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        // Wake the ticker only when the flag actually flips
        self.running_tx.send_if_modified(|running| {
            let changed = *running != snapshot.running;
            *running = snapshot.running;
            changed
        });

        Ok((result, snapshot))
    }

    pub fn start(&self) -> Result<TimerSnapshot, String> {
        let (started, snapshot) = self.update_engine("start", TimerEngine::start)?;
        if started {
            info!("Timer started in {} with {}s remaining", snapshot.mode, snapshot.time_remaining_seconds);
        } else {
            debug!("Timer already running");
        }
        Ok(snapshot)
    }

    pub fn stop(&self) -> Result<TimerSnapshot, String> {
        let (stopped, snapshot) = self.update_engine("stop", TimerEngine::stop)?;
        if stopped {
            info!("Timer stopped with {}s remaining", snapshot.time_remaining_seconds);
        }
        Ok(snapshot)
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        let (_, snapshot) = self.update_engine("reset", TimerEngine::reset)?;
        info!("Timer reset to {}s of focus", snapshot.time_remaining_seconds);
        Ok(snapshot)
    }

    /// End the current phase early and announce the new one
    pub fn skip(&self) -> Result<TimerSnapshot, String> {
        let ((mode, sound), snapshot) = self.update_engine("skip", |engine| {
            let mode = engine.skip();
            (mode, engine.sound(mode).to_string())
        })?;
        info!("Phase skipped, now in {}", mode);
        self.notify_stage(mode, sound, snapshot.session_count);
        Ok(snapshot)
    }

    /// Advance the countdown by one second. Called by the ticker task only.
    pub fn tick(&self) -> Result<TimerSnapshot, String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        let entered = engine.tick().map(|mode| (mode, engine.sound(mode).to_string()));
        let snapshot = engine.snapshot();
        drop(engine);

        if let Some((mode, sound)) = entered {
            info!("Stage complete, entering {} (session {})", mode, snapshot.session_count);
            self.notify_stage(mode, sound, snapshot.session_count);
        }
        Ok(snapshot)
    }

    fn notify_stage(&self, mode: Mode, sound: String, session_count: u32) {
        let event = StageEvent {
            mode,
            sound,
            session_count,
            at: Utc::now(),
        };
        debug!("Play sound {} for {}", event.sound, event.mode);

        // No receivers simply means no UI is listening right now
        if let Err(e) = self.stage_tx.send(event) {
            debug!("Stage notification not delivered: {}", e);
        }
    }

    pub fn configure_durations(&self, durations: Durations) -> Result<TimerSnapshot, String> {
        info!(
            "Configuring durations: focus={}s short={}s long={}s",
            durations.focus, durations.short_break, durations.long_break
        );
        let (_, snapshot) = self.update_engine("configure", |engine| {
            engine.configure_durations(durations)
        })?;
        Ok(snapshot)
    }

    /// Set a sound by wire name. Returns false for unknown stages.
    pub fn set_sound(&self, stage: &str, sound: String) -> Result<bool, String> {
        let (known, _) = self.update_engine("set-sound", |engine| {
            engine.set_sound_by_key(stage, sound)
        })?;
        if !known {
            warn!("Ignoring sound for unknown stage: {}", stage);
        }
        Ok(known)
    }

    pub fn get_sound(&self, stage: &str) -> Result<String, String> {
        self.engine.lock()
            .map(|engine| engine.sound_by_key(stage).to_string())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    pub fn start_activity(&self, name: String) -> Result<TimerSnapshot, String> {
        info!("Starting activity: {}", name);
        let (_, snapshot) = self.update_engine("start-activity", |engine| {
            engine.start_activity(name)
        })?;
        Ok(snapshot)
    }

    /// Close the current activity and return its log entry
    pub fn stop_activity(&self) -> Result<(Option<ActivityEntry>, TimerSnapshot), String> {
        let (closed, snapshot) = self.update_engine("stop-activity", |engine| {
            engine.stop_activity().cloned()
        })?;
        match &closed {
            Some(entry) => info!("Stopped activity {} after {}s", entry.name, entry.duration),
            None => debug!("No activity to stop"),
        }
        Ok((closed, snapshot))
    }

    pub fn get_activities(&self, days_ago: i64) -> Result<Vec<ActivityEntry>, String> {
        self.engine.lock()
            .map(|engine| engine.activities(days_ago).cloned().collect())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Get current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Push persisted settings into the engine
    pub fn apply_settings(&self, settings: &Settings) -> Result<TimerSnapshot, String> {
        let durations = settings.durations();
        let sounds = settings.sounds();
        let (_, snapshot) = self.update_engine("apply-settings", |engine| {
            engine.configure_durations(durations);
            engine.set_sounds(sounds);
        })?;
        Ok(snapshot)
    }

    /// Load a user's settings into the engine, falling back to defaults
    pub fn load_user_settings(&self, user_id: &str) -> Result<Settings, String> {
        let settings = match self.settings_store.get(user_id) {
            Ok(Some(settings)) => match settings.validate() {
                Ok(()) => {
                    info!("Loaded settings for user {}", user_id);
                    settings
                }
                Err(e) => {
                    warn!("Stored settings for user {} are invalid: {}, using defaults", user_id, e);
                    Settings::default()
                }
            },
            Ok(None) => {
                warn!("No settings stored for user {}, using defaults", user_id);
                Settings::default()
            }
            Err(e) => {
                warn!("Failed to fetch settings for user {}: {:#}, using defaults", user_id, e);
                Settings::default()
            }
        };
        self.apply_settings(&settings)?;
        Ok(settings)
    }

    /// Merge, validate, persist and apply a user's settings
    pub fn save_user_settings(
        &self,
        user_id: &str,
        patch: SettingsPatch,
    ) -> Result<SettingsDocument, SaveSettingsError> {
        let base = self.settings_store.get(user_id)
            .map_err(|e| SaveSettingsError::Store(format!("{:#}", e)))?
            .unwrap_or_default();
        let settings = base.merge(patch);
        settings.validate().map_err(SaveSettingsError::Invalid)?;

        let stored = self.settings_store.put(user_id, settings)
            .map_err(|e| SaveSettingsError::Store(format!("{:#}", e)))?;
        info!("Saved settings for user {}", user_id);

        if let Err(e) = self.apply_settings(&stored) {
            warn!("Saved settings for {} but failed to apply them: {}", user_id, e);
        }

        Ok(SettingsDocument {
            user_id: user_id.to_string(),
            settings: stored,
        })
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

/// Why saving settings failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveSettingsError {
    /// The merged settings did not pass validation
    Invalid(String),
    /// The store could not be read or written
    Store(String),
}

impl std::fmt::Display for SaveSettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveSettingsError::Invalid(msg) => write!(f, "invalid settings: {}", msg),
            SaveSettingsError::Store(msg) => write!(f, "settings store failure: {}", msg),
        }
    }
}

impl std::error::Error for SaveSettingsError {}
