mod engine;
mod settings;

pub use engine::{SessionEngine, WORK_SESSIONS_PER_LONG_BREAK};
pub use settings::{SessionPhase, SessionSettings, SessionState, SettingsPatch};
