use std::path::PathBuf;

use super::SettingsRepository;
use crate::error::{ConfigError, Result};
use crate::session::SessionSettings;

/// In-memory settings repository.
///
/// `failing()` makes every load and save fail, for exercising the
/// persistence-unavailable path.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    stored: Option<SessionSettings>,
    failing: bool,
    saves: usize,
}

impl MemorySettingsStore {
    pub fn with(settings: SessionSettings) -> Self {
        Self {
            stored: Some(settings),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Last successfully saved (or seeded) settings.
    pub fn saved(&self) -> Option<SessionSettings> {
        self.stored
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    fn unavailable() -> PathBuf {
        PathBuf::from("<memory>")
    }
}

impl SettingsRepository for MemorySettingsStore {
    fn load(&self) -> Result<SessionSettings> {
        if self.failing {
            return Err(ConfigError::LoadFailed {
                path: Self::unavailable(),
                message: "store unavailable".into(),
            }
            .into());
        }
        Ok(self.stored.unwrap_or_default())
    }

    fn save(&mut self, settings: &SessionSettings) -> Result<()> {
        if self.failing {
            return Err(ConfigError::SaveFailed {
                path: Self::unavailable(),
                message: "store unavailable".into(),
            }
            .into());
        }
        self.stored = Some(*settings);
        self.saves += 1;
        Ok(())
    }
}
