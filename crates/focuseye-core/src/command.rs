//! External command surface of the session engine.
//!
//! Commands arrive as `{"type": "...", "payload": ...}` actions. Each tag
//! narrows the payload type; anything unrecognised is rejected here, before
//! it can reach an engine.

use serde::Serialize;
use serde_json::Value;

use crate::error::CommandError;
use crate::session::{SessionPhase, SettingsPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Toggle the countdown.
    StartStop,
    Reset,
    ChangeSession(SessionPhase),
    UpdateSetting(SettingsPatch),
    /// Ask for a fresh session snapshot.
    GetState,
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::StartStop => "START_STOP",
            Command::Reset => "RESET",
            Command::ChangeSession(_) => "CHANGE_SESSION",
            Command::UpdateSetting(_) => "UPDATE_SETTING",
            Command::GetState => "GET_STATE",
        }
    }

    /// Parse one JSON action line.
    pub fn from_json(line: &str) -> Result<Self, CommandError> {
        let value: Value =
            serde_json::from_str(line).map_err(|e| CommandError::Malformed(e.to_string()))?;
        Self::parse(&value)
    }

    pub fn parse(action: &Value) -> Result<Self, CommandError> {
        let obj = action
            .as_object()
            .ok_or_else(|| CommandError::Malformed("action must be an object".into()))?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CommandError::MissingType)?;
        let payload = obj.get("payload").filter(|p| !p.is_null());

        match kind {
            "START_STOP" => Ok(Command::StartStop),
            "RESET" => Ok(Command::Reset),
            "GET_STATE" => Ok(Command::GetState),
            "CHANGE_SESSION" => {
                let payload = payload.ok_or(CommandError::MissingPayload("CHANGE_SESSION"))?;
                let phase = payload
                    .as_str()
                    .ok_or_else(|| CommandError::InvalidPhase(payload.to_string()))?;
                SessionPhase::parse(phase).map(Command::ChangeSession)
            }
            "UPDATE_SETTING" | "UPDATE_SETTINGS" => {
                let payload = payload.ok_or(CommandError::MissingPayload("UPDATE_SETTING"))?;
                let patch: SettingsPatch = serde_json::from_value(payload.clone())
                    .map_err(|e| CommandError::InvalidPatch(e.to_string()))?;
                if patch.is_empty() {
                    return Err(CommandError::InvalidPatch("no settings given".into()));
                }
                patch.validate()?;
                Ok(Command::UpdateSetting(patch))
            }
            other => Err(CommandError::UnknownType(other.to_string())),
        }
    }
}
