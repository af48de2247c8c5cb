//! Session engine implementation.
//!
//! The session engine is a wall-clock-based state machine. It does not own a
//! thread or a real timer: the countdown is a deadline the caller polls by
//! invoking `tick(now_ms)`, and every operation returns the notifications it
//! produced.
//!
//! ## Phase Transitions
//!
//! ```text
//! Work -> ShortBreak   (completed work sessions % 4 != 0)
//! Work -> LongBreak    (completed work sessions % 4 == 0)
//! ShortBreak | LongBreak -> Work
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(settings);
//! engine.start(now_ms);
//! // Whenever `next_deadline()` elapses:
//! engine.tick(now_ms); // Returns Some(Event) when the state changed
//! ```

use tracing::{debug, info, warn};

use super::settings::{SessionPhase, SessionSettings, SessionState, SettingsPatch};
use crate::events::Event;
use crate::storage::SettingsRepository;

/// Work sessions per long break.
pub const WORK_SESSIONS_PER_LONG_BREAK: u32 = 4;

const TICK_MS: u64 = 1000;

/// The active countdown timer. Present exactly while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    /// Reference timestamp; advanced by the whole seconds consumed per tick.
    last_tick_ms: u64,
}

/// Work/break cycling engine.
///
/// Owns the live session state; consumers only ever see `SessionState`
/// copies.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    settings: SessionSettings,
    phase: SessionPhase,
    seconds_remaining: u32,
    work_count: u32,
    short_break_count: u32,
    long_break_count: u32,
    countdown: Option<Countdown>,
}

impl SessionEngine {
    /// Create an idle engine in the Work phase.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            seconds_remaining: settings.work,
            settings,
            phase: SessionPhase::Work,
            work_count: 0,
            short_break_count: 0,
            long_break_count: 0,
            countdown: None,
        }
    }

    /// Load settings once from `repo`, falling back to defaults.
    pub fn from_repository<R: SettingsRepository + ?Sized>(repo: &R) -> Self {
        let settings = repo.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load session settings, using defaults");
            SessionSettings::default()
        });
        Self::new(settings)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            is_running: self.is_running(),
            work_count: self.work_count,
            short_break_count: self.short_break_count,
            long_break_count: self.long_break_count,
            settings: self.settings,
        }
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_some()
    }

    /// When the next tick is due, if the countdown is active.
    pub fn next_deadline(&self) -> Option<u64> {
        self.countdown.map(|c| c.last_tick_ms + TICK_MS)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::session(self.state())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        self.countdown = Some(Countdown {
            last_tick_ms: now_ms,
        });
        debug!(phase = self.phase.as_str(), "session countdown started");
        Some(self.snapshot())
    }

    pub fn stop(&mut self) -> Event {
        if self.countdown.take().is_some() {
            debug!(phase = self.phase.as_str(), "session countdown stopped");
        }
        self.snapshot()
    }

    /// `START_STOP` semantics.
    pub fn toggle(&mut self, now_ms: u64) -> Event {
        if self.is_running() {
            self.stop()
        } else {
            // Not running, so start always yields a snapshot.
            self.start(now_ms).unwrap_or_else(|| self.snapshot())
        }
    }

    pub fn reset(&mut self) -> Event {
        self.countdown = None;
        self.phase = SessionPhase::Work;
        self.seconds_remaining = self.settings.work;
        self.work_count = 0;
        self.short_break_count = 0;
        self.long_break_count = 0;
        self.snapshot()
    }

    /// Call whenever `next_deadline()` has elapsed.
    ///
    /// Subtracts the whole seconds that actually elapsed since the last
    /// tick, so coalesced or late deliveries do not slow the countdown.
    /// Returns `None` when nothing changed.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let countdown = self.countdown.as_mut()?;
        let elapsed_secs = now_ms.saturating_sub(countdown.last_tick_ms) / TICK_MS;
        if elapsed_secs == 0 {
            return None;
        }
        countdown.last_tick_ms += elapsed_secs * TICK_MS;

        let elapsed = u32::try_from(elapsed_secs).unwrap_or(u32::MAX);
        self.seconds_remaining = self.seconds_remaining.saturating_sub(elapsed);
        if self.seconds_remaining == 0 {
            self.end_phase();
        }
        Some(self.snapshot())
    }

    /// Jump straight to `target`. Counts and running state are untouched.
    pub fn change_phase(&mut self, target: SessionPhase) -> Event {
        self.phase = target;
        self.seconds_remaining = self.settings.duration_of(target);
        debug!(phase = target.as_str(), "session phase changed by command");
        self.snapshot()
    }

    /// Merge `patch`, persist the result and apply it.
    ///
    /// Only the Work phase is resized to the new duration; an active break
    /// keeps its remaining time, clamped to the new break duration. A
    /// failed save still applies the settings and adds a
    /// `SettingsPersistFailed` event.
    ///
    /// `seconds_remaining <= duration(phase)` wins over leaving a break
    /// untouched: lengthening a break never extends it, shortening one
    /// below the time left cuts it to the new duration.
    pub fn update_settings<R: SettingsRepository + ?Sized>(
        &mut self,
        patch: &SettingsPatch,
        repo: &mut R,
    ) -> Vec<Event> {
        if let Err(e) = patch.validate() {
            debug!(error = %e, "ignoring settings patch");
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);
        self.settings = self.settings.merged(patch);
        if let Err(e) = repo.save(&self.settings) {
            warn!(error = %e, "failed to persist session settings");
            events.push(Event::SettingsPersistFailed {
                message: e.to_string(),
                at: chrono::Utc::now(),
            });
        }

        let duration = self.settings.duration_of(self.phase);
        self.seconds_remaining = if self.phase == SessionPhase::Work {
            duration
        } else {
            self.seconds_remaining.min(duration)
        };
        events.push(self.snapshot());
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn end_phase(&mut self) {
        let ended = self.phase;
        let next = match ended {
            SessionPhase::Work => {
                self.work_count += 1;
                if self.work_count % WORK_SESSIONS_PER_LONG_BREAK == 0 {
                    SessionPhase::LongBreak
                } else {
                    SessionPhase::ShortBreak
                }
            }
            SessionPhase::ShortBreak => {
                self.short_break_count += 1;
                SessionPhase::Work
            }
            SessionPhase::LongBreak => {
                self.long_break_count += 1;
                SessionPhase::Work
            }
        };
        self.phase = next;
        self.seconds_remaining = self.settings.duration_of(next);
        if !self.settings.auto_start {
            self.countdown = None;
        }
        info!(
            ended = ended.as_str(),
            next = next.as_str(),
            auto_start = self.settings.auto_start,
            "session phase ended"
        );
    }
}
