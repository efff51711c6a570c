//! Settings persistence backends

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context};
use tracing::{debug, info};

use crate::state::Settings;

/// Per-user settings storage
pub trait SettingsStore: Send + Sync {
    /// Settings for `user_id`, or `None` when the user has never saved any
    fn get(&self, user_id: &str) -> anyhow::Result<Option<Settings>>;

    /// Insert or replace the settings for `user_id` and return what was stored
    fn put(&self, user_id: &str, settings: Settings) -> anyhow::Result<Settings>;
}

/// Settings kept only for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<HashMap<String, Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, user_id: &str) -> anyhow::Result<Option<Settings>> {
        let entries = self.entries.lock()
            .map_err(|e| anyhow!("Failed to lock settings store: {}", e))?;
        Ok(entries.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, settings: Settings) -> anyhow::Result<Settings> {
        let mut entries = self.entries.lock()
            .map_err(|e| anyhow!("Failed to lock settings store: {}", e))?;
        entries.insert(user_id.to_string(), settings.clone());
        Ok(settings)
    }
}

/// Settings for every user serialized into a single JSON file
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Settings>>,
}

impl JsonFileSettingsStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries: HashMap<String, Settings> = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))?
        } else {
            HashMap::new()
        };

        info!("Opened settings store at {} ({} users)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write(&self, entries: &HashMap<String, Settings>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(entries)?;

        // Write a sibling file and rename it over the original so a crash
        // mid-write never leaves a truncated store behind
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, raw)
            .with_context(|| format!("Failed to write settings file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace settings file {}", self.path.display()))?;
        debug!("Wrote {} settings entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn get(&self, user_id: &str) -> anyhow::Result<Option<Settings>> {
        let entries = self.entries.lock()
            .map_err(|e| anyhow!("Failed to lock settings store: {}", e))?;
        Ok(entries.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, settings: Settings) -> anyhow::Result<Settings> {
        let mut entries = self.entries.lock()
            .map_err(|e| anyhow!("Failed to lock settings store: {}", e))?;

        let previous = entries.insert(user_id.to_string(), settings.clone());
        if let Err(e) = self.write(&entries) {
            // Keep memory and disk in agreement when the write fails
            match previous {
                Some(old) => entries.insert(user_id.to_string(), old),
                None => entries.remove(user_id),
            };
            return Err(e);
        }
        Ok(settings)
    }
}
