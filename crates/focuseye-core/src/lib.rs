//! # focuseye Core Library
//!
//! Core logic for the focuseye desktop companion: a work/break session
//! timer and a pair of watching eyes whose mood follows how long the user
//! has been idle. The desktop shell, tray and renderer are thin consumers
//! of the notifications produced here.
//!
//! ## Architecture
//!
//! - **Session Engine**: wall-clock work/short-break/long-break state machine;
//!   the caller invokes `tick()` when its deadline elapses
//! - **Attention Engine**: Calm/Wary/Alert/Resting mood machine driven by
//!   pointer activity samples and the session phase
//! - **Activity Sampler**: turns pointer positions into activity signals
//! - **Storage**: TOML-based persistence of the single settings record
//! - **Runtime**: single-task driver that owns both engines
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Work/break cycling
//! - [`AttentionEngine`]: Mood inference
//! - [`Companion`]: Event loop wiring engines, sampler, storage and sink
//! - [`Command`]: Validated external command surface

pub mod activity;
pub mod attention;
pub mod command;
pub mod error;
pub mod events;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod tray;

pub use activity::{ActivitySampler, PointerPosition, PointerSource, SamplerConfig};
pub use attention::{AttentionConfig, AttentionEngine, Mood};
pub use command::Command;
pub use error::{CommandError, ConfigError, CoreError};
pub use events::{ChannelSink, Event, NotificationSink, RecordingSink};
pub use runtime::{Companion, CompanionConfig, CompanionHandle};
pub use session::{SessionEngine, SessionPhase, SessionSettings, SessionState, SettingsPatch};
pub use storage::{MemorySettingsStore, SettingsRepository, TomlSettingsStore};
