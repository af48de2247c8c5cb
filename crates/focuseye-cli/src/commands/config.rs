use std::path::PathBuf;

use clap::Subcommand;
use focuseye_core::SettingsRepository;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key ("work", "shortBreak", "longBreak", "autoStart")
        key: String,
        /// Settings file (defaults to ~/.config/focuseye/settings.toml)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value (seconds for durations, true/false for autoStart)
        value: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List all settings
    List {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Reset settings to defaults
    Reset {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key, file } => {
            let store = super::settings_store(file)?;
            println!("{}", store.get(&key)?);
        }
        ConfigAction::Set { key, value, file } => {
            let mut store = super::settings_store(file)?;
            store.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List { file } => {
            let store = super::settings_store(file)?;
            let json = serde_json::to_string_pretty(&store.load()?)?;
            println!("{json}");
        }
        ConfigAction::Reset { file } => {
            let mut store = super::settings_store(file)?;
            store.reset()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
