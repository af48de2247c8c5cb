pub mod config;
pub mod run;
pub mod status;

use std::path::PathBuf;

use focuseye_core::TomlSettingsStore;

/// Settings store at `path`, or the standard location.
pub fn settings_store(
    path: Option<PathBuf>,
) -> Result<TomlSettingsStore, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(TomlSettingsStore::at(path)),
        None => Ok(TomlSettingsStore::open_default()?),
    }
}
