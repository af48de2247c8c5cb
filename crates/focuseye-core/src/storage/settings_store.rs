//! TOML-based settings storage.
//!
//! Stores the single session settings record:
//! - `work`, `shortBreak`, `longBreak` durations in seconds
//! - `autoStart` policy
//!
//! Stored at `~/.config/focuseye/settings.toml` and overwritten wholesale on
//! every save.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{data_dir, SettingsRepository};
use crate::error::{ConfigError, Result};
use crate::session::{SessionSettings, SettingsPatch};

#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    /// Store at the standard location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("settings.toml")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a settings value as string by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the file cannot be read.
    pub fn get(&self, key: &str) -> Result<String> {
        let json = serde_json::to_value(self.load()?)?;
        let value = json
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        Ok(value.to_string())
    }

    /// Set a settings value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the settings cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<SessionSettings> {
        let patch = Self::parse_patch(key, value)?;
        patch.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let settings = self.load()?.merged(&patch);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Overwrite the file with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be written.
    pub fn reset(&mut self) -> Result<SessionSettings> {
        let settings = SessionSettings::default();
        self.save(&settings)?;
        Ok(settings)
    }

    fn parse_patch(key: &str, value: &str) -> Result<SettingsPatch> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let seconds = || {
            value
                .parse::<u32>()
                .map_err(|e| invalid(format!("cannot parse '{value}' as seconds: {e}")))
        };

        let mut patch = SettingsPatch::default();
        match key {
            "work" => patch.work = Some(seconds()?),
            "shortBreak" => patch.short_break = Some(seconds()?),
            "longBreak" => patch.long_break = Some(seconds()?),
            "autoStart" => {
                patch.auto_start = Some(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                )
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
        }
        Ok(patch)
    }
}

impl SettingsRepository for TomlSettingsStore {
    /// Load from disk, writing defaults if the file does not exist yet.
    fn load(&self) -> Result<SessionSettings> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file missing, writing defaults");
                let settings = SessionSettings::default();
                self.write(&settings)?;
                return Ok(settings);
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
                .into())
            }
        };

        let settings: SessionSettings =
            toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        if let Some(field) = settings.invalid_field() {
            return Err(ConfigError::InvalidValue {
                key: field.to_string(),
                message: "duration must be a positive number of seconds".into(),
            }
            .into());
        }
        Ok(settings)
    }

    fn save(&mut self, settings: &SessionSettings) -> Result<()> {
        self.write(settings)
    }
}

impl TomlSettingsStore {
    fn write(&self, settings: &SessionSettings) -> Result<()> {
        let content = toml::to_string_pretty(settings)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, TomlSettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlSettingsStore::at(dir.path().join("settings.toml"));
        (dir, store)
    }

    #[test]
    fn missing_file_writes_defaults() {
        let (_dir, store) = temp_store();
        let settings = store.load().unwrap();
        assert_eq!(settings, SessionSettings::default());
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("work = 1500"));
        assert!(content.contains("shortBreak = 300"));
        assert!(content.contains("longBreak = 900"));
        assert!(content.contains("autoStart = true"));
    }

    #[test]
    fn save_overwrites_whole_record() {
        let (_dir, mut store) = temp_store();
        let settings = SessionSettings {
            work: 50,
            short_break: 10,
            long_break: 20,
            auto_start: false,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "work = 42\n").unwrap();
        let settings = store.load().unwrap();
        assert_eq!(settings.work, 42);
        assert_eq!(settings.long_break, 900);
        assert!(settings.auto_start);
    }

    #[test]
    fn zero_duration_on_disk_is_rejected() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "shortBreak = 0\n").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn get_and_set_by_key() {
        let (_dir, mut store) = temp_store();
        assert_eq!(store.get("work").unwrap(), "1500");
        assert_eq!(store.get("autoStart").unwrap(), "true");

        let updated = store.set("longBreak", "1200").unwrap();
        assert_eq!(updated.long_break, 1200);
        assert_eq!(store.get("longBreak").unwrap(), "1200");

        store.set("autoStart", "false").unwrap();
        assert!(!store.load().unwrap().auto_start);
    }

    #[test]
    fn set_rejects_bad_input() {
        let (_dir, mut store) = temp_store();
        assert!(store.set("volume", "3").is_err());
        assert!(store.set("work", "soon").is_err());
        assert!(store.set("work", "0").is_err());
        assert!(store.set("autoStart", "maybe").is_err());
        assert_eq!(store.load().unwrap(), SessionSettings::default());
    }

    #[test]
    fn reset_restores_defaults() {
        let (_dir, mut store) = temp_store();
        store.set("work", "60").unwrap();
        store.reset().unwrap();
        assert_eq!(store.load().unwrap().work, 1500);
    }
}
