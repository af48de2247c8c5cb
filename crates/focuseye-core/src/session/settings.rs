use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// The interval kind the session engine is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionPhase {
    pub const ALL: [SessionPhase; 3] = [
        SessionPhase::Work,
        SessionPhase::ShortBreak,
        SessionPhase::LongBreak,
    ];

    pub fn is_break(self) -> bool {
        !matches!(self, SessionPhase::Work)
    }

    /// Wire name, as used in commands and the settings file.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Work => "work",
            SessionPhase::ShortBreak => "shortBreak",
            SessionPhase::LongBreak => "longBreak",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionPhase::Work => "Work",
            SessionPhase::ShortBreak => "Short Break",
            SessionPhase::LongBreak => "Long Break",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CommandError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| CommandError::InvalidPhase(value.to_string()))
    }
}

/// Durations (whole seconds) and the auto-start policy.
///
/// Replaced wholesale on every update; the engine never mutates a field
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    #[serde(default = "default_work")]
    pub work: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

fn default_work() -> u32 {
    1500
}
fn default_short_break() -> u32 {
    300
}
fn default_long_break() -> u32 {
    900
}
fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            work: default_work(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            auto_start: default_true(),
        }
    }
}

impl SessionSettings {
    /// Configured duration of `phase` in seconds.
    pub fn duration_of(&self, phase: SessionPhase) -> u32 {
        match phase {
            SessionPhase::Work => self.work,
            SessionPhase::ShortBreak => self.short_break,
            SessionPhase::LongBreak => self.long_break,
        }
    }

    /// Name of the first zero duration, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        SessionPhase::ALL
            .into_iter()
            .find(|p| self.duration_of(*p) == 0)
            .map(SessionPhase::as_str)
    }

    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            work: patch.work.unwrap_or(self.work),
            short_break: patch.short_break.unwrap_or(self.short_break),
            long_break: patch.long_break.unwrap_or(self.long_break),
            auto_start: patch.auto_start.unwrap_or(self.auto_start),
        }
    }
}

/// Partial settings carried by an `UPDATE_SETTING` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Durations must stay positive.
    pub fn validate(&self) -> Result<(), CommandError> {
        let zero = [
            ("work", self.work),
            ("shortBreak", self.short_break),
            ("longBreak", self.long_break),
        ]
        .into_iter()
        .find(|(_, v)| *v == Some(0));
        match zero {
            Some((field, _)) => Err(CommandError::InvalidPatch(format!(
                "{field} must be a positive number of seconds"
            ))),
            None => Ok(()),
        }
    }
}

/// Immutable copy of the session engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: SessionPhase,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub work_count: u32,
    pub short_break_count: u32,
    pub long_break_count: u32,
    pub settings: SessionSettings,
}
