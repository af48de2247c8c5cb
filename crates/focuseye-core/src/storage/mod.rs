mod memory;
mod settings_store;

pub use memory::MemorySettingsStore;
pub use settings_store::TomlSettingsStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::session::SessionSettings;

/// Durable home of the single settings record.
pub trait SettingsRepository {
    fn load(&self) -> Result<SessionSettings>;
    fn save(&mut self, settings: &SessionSettings) -> Result<()>;
}

/// Returns `~/.config/focuseye[-dev]/` based on FOCUSEYE_ENV.
///
/// Set FOCUSEYE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .ok_or_else(|| ConfigError::NoDataDir("no home or config directory".into()))?;

    let env = std::env::var("FOCUSEYE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focuseye-dev")
    } else {
        base_dir.join("focuseye")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
