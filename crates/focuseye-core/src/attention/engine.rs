//! Attention engine - idle escalation with activity step-down
//!
//! Infers a mood from pointer activity samples and from the session
//! engine's phase.
//!
//! ## Moods
//!
//! - **Calm**: default; the user is active or only briefly idle
//! - **Wary**: idle past `wary_after_idle_ms`
//! - **Alert**: still idle after the Wary escalation window
//! - **Resting**: forced for the whole of any break phase
//!
//! ## Timers
//!
//! The engine owns two deadlines. The escalation timer is armed on
//! Calm -> Wary and forces Wary -> Alert when it fires. The step-down timer
//! is armed by activity while Wary or Alert and lowers the mood one level.
//! Every transition clears both before arming anything for the new mood, so
//! a timer can never fire into a state it was not armed for.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::Event;
use crate::session::SessionPhase;

/// Inferred attention mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Wary,
    Alert,
    Resting,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Wary => "wary",
            Mood::Alert => "alert",
            Mood::Resting => "resting",
        }
    }
}

/// Timing thresholds for mood transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionConfig {
    /// Idle time before Calm -> Wary (default: 60 seconds)
    pub wary_after_idle_ms: u64,
    /// Idle time after entering Wary before Alert (default: 90 seconds)
    pub alert_after_wary_ms: u64,
    /// Absolute escalation timer armed on Calm -> Wary (default: 90 seconds)
    pub escalation_ms: u64,
    /// Grace period before activity lowers the mood (default: 10 seconds)
    pub step_down_ms: u64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            wary_after_idle_ms: 60 * 1000,
            alert_after_wary_ms: 90 * 1000,
            escalation_ms: 90 * 1000,
            step_down_ms: 10 * 1000,
        }
    }
}

/// Owned copy of the engine state, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionSnapshot {
    pub mood: Mood,
    /// The mood that was left to enter the current one.
    pub source: Option<Mood>,
    pub last_activity_ms: u64,
    pub escalation_at_ms: Option<u64>,
    pub step_down_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Escalation,
    StepDown,
}

#[derive(Debug, Clone)]
pub struct AttentionEngine {
    config: AttentionConfig,
    mood: Mood,
    source: Option<Mood>,
    /// When the current mood was entered.
    mood_since_ms: u64,
    last_activity_ms: u64,
    escalation_at_ms: Option<u64>,
    step_down_at_ms: Option<u64>,
}

impl AttentionEngine {
    /// Start Calm, treating `now_ms` as the last activity.
    pub fn new(config: AttentionConfig, now_ms: u64) -> Self {
        Self {
            config,
            mood: Mood::Calm,
            source: None,
            mood_since_ms: now_ms,
            last_activity_ms: now_ms,
            escalation_at_ms: None,
            step_down_at_ms: None,
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn snapshot(&self) -> AttentionSnapshot {
        AttentionSnapshot {
            mood: self.mood,
            source: self.source,
            last_activity_ms: self.last_activity_ms,
            escalation_at_ms: self.escalation_at_ms,
            step_down_at_ms: self.step_down_at_ms,
        }
    }

    pub fn has_pending_timers(&self) -> bool {
        self.escalation_at_ms.is_some() || self.step_down_at_ms.is_some()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.escalation_at_ms, self.step_down_at_ms) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply one pointer sample.
    ///
    /// Timers that are already due fire first, so a sample never observes
    /// a state that a timer should have replaced.
    pub fn on_activity_sample(&mut self, moved: bool, now_ms: u64) -> Vec<Event> {
        let mut events = self.fire_due_timers(now_ms);
        if self.mood == Mood::Resting {
            return events;
        }

        if moved {
            self.escalation_at_ms = None;
            if matches!(self.mood, Mood::Wary | Mood::Alert) && self.step_down_at_ms.is_none() {
                self.step_down_at_ms = Some(now_ms + self.config.step_down_ms);
                debug!(mood = self.mood.as_str(), "step-down armed");
            }
            self.last_activity_ms = now_ms;
            return events;
        }

        let idle_ms = now_ms.saturating_sub(self.last_activity_ms);
        match self.mood {
            Mood::Calm if idle_ms >= self.config.wary_after_idle_ms => {
                events.extend(self.transition(Mood::Wary, now_ms));
            }
            Mood::Wary if self.source == Some(Mood::Calm) => {
                let reference = self.last_activity_ms.max(self.mood_since_ms);
                if now_ms.saturating_sub(reference) >= self.config.alert_after_wary_ms {
                    events.extend(self.transition(Mood::Alert, now_ms));
                }
            }
            _ => {}
        }
        events
    }

    /// Break phases force Resting; Work releases it back to Calm.
    pub fn on_session_phase_changed(&mut self, phase: SessionPhase, now_ms: u64) -> Vec<Event> {
        let mut events = self.fire_due_timers(now_ms);
        if phase.is_break() {
            events.extend(self.transition(Mood::Resting, now_ms));
        } else if self.mood == Mood::Resting {
            events.extend(self.transition(Mood::Calm, now_ms));
            self.last_activity_ms = now_ms;
        }
        events
    }

    /// Drop both timers without changing the mood (shutdown).
    pub fn cancel_timers(&mut self) {
        self.escalation_at_ms = None;
        self.step_down_at_ms = None;
    }

    /// Fire every timer whose deadline is at or before `now_ms`, earliest
    /// first. A fired timer is cleared before its transition runs.
    pub fn fire_due_timers(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((kind, at)) = self.due_timer(now_ms) {
            match kind {
                TimerKind::Escalation => self.escalation_at_ms = None,
                TimerKind::StepDown => self.step_down_at_ms = None,
            }
            let target = match (kind, self.mood) {
                (TimerKind::Escalation, Mood::Wary) => Some(Mood::Alert),
                (TimerKind::StepDown, Mood::Alert) => Some(Mood::Wary),
                (TimerKind::StepDown, Mood::Wary) => Some(Mood::Calm),
                _ => None,
            };
            if let Some(target) = target {
                debug!(timer = ?kind, to = target.as_str(), "attention timer fired");
                events.extend(self.transition(target, at));
            }
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn due_timer(&self, now_ms: u64) -> Option<(TimerKind, u64)> {
        let escalation = self
            .escalation_at_ms
            .filter(|at| *at <= now_ms)
            .map(|at| (TimerKind::Escalation, at));
        let step_down = self
            .step_down_at_ms
            .filter(|at| *at <= now_ms)
            .map(|at| (TimerKind::StepDown, at));
        match (escalation, step_down) {
            (Some(e), Some(s)) => Some(if s.1 < e.1 { s } else { e }),
            (e, s) => e.or(s),
        }
    }

    fn transition(&mut self, target: Mood, at_ms: u64) -> Option<Event> {
        if self.mood == target {
            return None;
        }
        self.escalation_at_ms = None;
        self.step_down_at_ms = None;

        let previous = self.mood;
        self.mood = target;
        self.source = Some(previous);
        self.mood_since_ms = at_ms;

        if target == Mood::Wary && previous == Mood::Calm {
            self.escalation_at_ms = Some(at_ms + self.config.escalation_ms);
        }
        debug!(from = previous.as_str(), to = target.as_str(), "mood changed");
        Some(Event::mood(target, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = 1000;

    fn idle_until(engine: &mut AttentionEngine, from_s: u64, to_s: u64) -> Vec<Mood> {
        (from_s..=to_s)
            .flat_map(|s| engine.on_activity_sample(false, s * SEC))
            .filter_map(|e| e.new_mood())
            .collect()
    }

    fn wary_engine() -> AttentionEngine {
        let mut engine = AttentionEngine::new(AttentionConfig::default(), 0);
        idle_until(&mut engine, 0, 60);
        assert_eq!(engine.mood(), Mood::Wary);
        engine
    }

    #[test]
    fn idle_for_a_minute_turns_wary() {
        let mut engine = AttentionEngine::new(AttentionConfig::default(), 0);
        assert_eq!(idle_until(&mut engine, 0, 59), vec![]);
        assert_eq!(idle_until(&mut engine, 60, 60), vec![Mood::Wary]);
        assert_eq!(engine.snapshot().source, Some(Mood::Calm));
        assert_eq!(engine.snapshot().escalation_at_ms, Some(150 * SEC));
    }

    #[test]
    fn activity_while_wary_steps_down_after_grace_period() {
        let mut engine = wary_engine();
        engine.on_activity_sample(true, 65 * SEC);
        let snap = engine.snapshot();
        assert_eq!(snap.escalation_at_ms, None);
        assert_eq!(snap.step_down_at_ms, Some(75 * SEC));

        assert_eq!(idle_until(&mut engine, 66, 74), vec![]);
        assert_eq!(idle_until(&mut engine, 75, 75), vec![Mood::Calm]);
        assert!(!engine.has_pending_timers());
    }

    #[test]
    fn repeated_activity_does_not_rearm_step_down() {
        let mut engine = wary_engine();
        engine.on_activity_sample(true, 65 * SEC);
        engine.on_activity_sample(true, 70 * SEC);
        assert_eq!(engine.snapshot().step_down_at_ms, Some(75 * SEC));
    }

    #[test]
    fn escalation_timer_forces_alert() {
        let mut engine = wary_engine();
        let events = engine.fire_due_timers(150 * SEC);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.mood(), Mood::Alert);
        assert!(!engine.has_pending_timers());
    }

    #[test]
    fn alert_steps_down_one_level_at_a_time() {
        let mut engine = wary_engine();
        engine.fire_due_timers(150 * SEC);
        engine.on_activity_sample(true, 151 * SEC);
        engine.fire_due_timers(161 * SEC);
        assert_eq!(engine.mood(), Mood::Wary);
        assert_eq!(engine.snapshot().source, Some(Mood::Alert));

        // Wary entered from Alert never re-escalates by itself.
        assert_eq!(idle_until(&mut engine, 162, 400), vec![]);
        assert!(!engine.has_pending_timers());

        engine.on_activity_sample(true, 401 * SEC);
        engine.fire_due_timers(411 * SEC);
        assert_eq!(engine.mood(), Mood::Calm);
    }

    #[test]
    fn calm_activity_resets_idle_clock() {
        let mut engine = AttentionEngine::new(AttentionConfig::default(), 0);
        idle_until(&mut engine, 0, 50);
        engine.on_activity_sample(true, 50 * SEC);
        assert_eq!(idle_until(&mut engine, 51, 109), vec![]);
        assert_eq!(idle_until(&mut engine, 110, 110), vec![Mood::Wary]);
    }

    #[test]
    fn break_phase_forces_resting_and_cancels_timers() {
        let mut engine = wary_engine();
        engine.fire_due_timers(150 * SEC);
        engine.on_activity_sample(true, 151 * SEC);
        assert!(engine.has_pending_timers());

        let events = engine.on_session_phase_changed(SessionPhase::ShortBreak, 152 * SEC);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.mood(), Mood::Resting);
        assert!(!engine.has_pending_timers());
        assert!(engine.fire_due_timers(500 * SEC).is_empty());
        assert_eq!(engine.mood(), Mood::Resting);
    }

    #[test]
    fn resting_ignores_samples_until_work_resumes() {
        let mut engine = AttentionEngine::new(AttentionConfig::default(), 0);
        engine.on_session_phase_changed(SessionPhase::LongBreak, 0);
        assert!(engine
            .on_session_phase_changed(SessionPhase::ShortBreak, 1)
            .is_empty());
        for s in 0..300 {
            assert!(engine.on_activity_sample(s % 7 == 0, s * SEC).is_empty());
        }
        assert_eq!(engine.mood(), Mood::Resting);

        let events = engine.on_session_phase_changed(SessionPhase::Work, 300 * SEC);
        assert_eq!(events[0].new_mood(), Some(Mood::Calm));
        assert_eq!(engine.snapshot().last_activity_ms, 300 * SEC);
        assert_eq!(idle_until(&mut engine, 301, 359), vec![]);
        assert_eq!(idle_until(&mut engine, 360, 360), vec![Mood::Wary]);
    }

    #[test]
    fn work_phase_while_not_resting_is_noop() {
        let mut engine = wary_engine();
        let before = engine.snapshot();
        assert!(engine
            .on_session_phase_changed(SessionPhase::Work, 61 * SEC)
            .is_empty());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn next_deadline_is_earliest_timer() {
        let mut engine = wary_engine();
        assert_eq!(engine.next_deadline(), Some(150 * SEC));
        engine.on_activity_sample(true, 61 * SEC);
        assert_eq!(engine.next_deadline(), Some(71 * SEC));
    }
}
