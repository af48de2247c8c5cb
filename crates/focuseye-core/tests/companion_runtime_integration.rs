//! Integration tests for the companion driver.
//!
//! Runs the real `select!` loop on a paused tokio clock, so timers and the
//! 100ms sampling interval advance deterministically.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use focuseye_core::activity::{PointerPosition, PointerSource};
use focuseye_core::error::Result;
use focuseye_core::{
    Command, Companion, CompanionConfig, Event, MemorySettingsStore, Mood, RecordingSink,
    SessionPhase, SessionSettings, SettingsPatch,
};
use serde_json::json;

/// Pointer the test can move while the driver owns it.
#[derive(Clone, Default)]
struct SharedPointer(Arc<Mutex<PointerPosition>>);

impl SharedPointer {
    fn nudge(&self) {
        let mut p = self.0.lock().unwrap();
        p.x += 1;
    }
}

impl PointerSource for SharedPointer {
    fn position(&mut self) -> Result<PointerPosition> {
        Ok(*self.0.lock().unwrap())
    }
}

fn quick_settings(auto_start: bool) -> SessionSettings {
    SessionSettings {
        work: 5,
        short_break: 2,
        long_break: 3,
        auto_start,
    }
}

type TestCompanion = Companion<MemorySettingsStore, SharedPointer, RecordingSink>;

fn companion(settings: SessionSettings) -> (TestCompanion, focuseye_core::CompanionHandle, SharedPointer) {
    let pointer = SharedPointer::default();
    let (companion, handle) = Companion::new(
        MemorySettingsStore::with(settings),
        pointer.clone(),
        RecordingSink::default(),
        CompanionConfig::default(),
    );
    (companion, handle, pointer)
}

#[tokio::test(start_paused = true)]
async fn work_rolls_into_resting_short_break() {
    let (companion, handle, _pointer) = companion(quick_settings(true));
    let task = tokio::spawn(companion.run());

    handle.send(Command::StartStop);
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    let state = companion
        .sink()
        .events
        .iter()
        .rev()
        .filter_map(Event::session_state)
        .find(|s| s.is_running)
        .cloned()
        .unwrap();
    assert_eq!(state.phase, SessionPhase::ShortBreak);
    assert_eq!(state.seconds_remaining, 2);
    assert_eq!(state.work_count, 1);

    assert_eq!(companion.mood(), Mood::Resting);
    assert_eq!(companion.sink().moods(), vec![Mood::Resting]);
    assert!(!companion.session_state().is_running, "stopped on shutdown");
}

#[tokio::test(start_paused = true)]
async fn break_end_without_auto_start_stops_in_work() {
    let (companion, handle, _pointer) = companion(quick_settings(false));
    let task = tokio::spawn(companion.run());

    handle.send(Command::ChangeSession(SessionPhase::ShortBreak));
    handle.send(Command::StartStop);
    tokio::time::sleep(Duration::from_millis(4_000)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    let last = companion.sink().last_session().unwrap();
    assert_eq!(last.phase, SessionPhase::Work);
    assert_eq!(last.seconds_remaining, 5);
    assert!(!last.is_running);
    assert_eq!(last.short_break_count, 1);
    assert_eq!(companion.sink().moods(), vec![Mood::Resting, Mood::Calm]);
}

#[tokio::test(start_paused = true)]
async fn idle_pointer_escalates_and_activity_steps_down() {
    let (companion, handle, pointer) = companion(SessionSettings::default());
    let task = tokio::spawn(companion.run());

    tokio::time::sleep(Duration::from_millis(65_050)).await;
    pointer.nudge();
    tokio::time::sleep(Duration::from_millis(20_000)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    assert_eq!(companion.sink().moods(), vec![Mood::Wary, Mood::Calm]);
    assert!(companion
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, Event::CursorMoved { .. })));
    let snapshot = companion.attention_snapshot();
    assert_eq!(snapshot.escalation_at_ms, None);
    assert_eq!(snapshot.step_down_at_ms, None);
}

#[tokio::test(start_paused = true)]
async fn untouched_pointer_reaches_alert() {
    let (companion, handle, _pointer) = companion(SessionSettings::default());
    let task = tokio::spawn(companion.run());

    tokio::time::sleep(Duration::from_secs(200)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    assert_eq!(companion.sink().moods(), vec![Mood::Wary, Mood::Alert]);
}

#[tokio::test(start_paused = true)]
async fn invalid_actions_change_nothing() {
    let (companion, handle, _pointer) = companion(SessionSettings::default());
    let task = tokio::spawn(companion.run());

    assert!(!handle.send_action(&json!({ "type": "CHANGE_SESSION", "payload": "nap" })));
    assert!(!handle.send_action(&json!({ "type": "UPDATE_SETTING", "payload": { "work": 0 } })));
    assert!(!handle.send_action(&json!({ "type": "SNOOZE" })));
    assert!(handle.send_action(&json!({ "type": "GET_STATE" })));
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    let state = companion.session_state();
    assert_eq!(state.phase, SessionPhase::Work);
    assert_eq!(state.seconds_remaining, 1500);
    assert_eq!(companion.repository().save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn persist_failure_is_reported_but_applied() {
    let pointer = SharedPointer::default();
    let (companion, handle) = Companion::new(
        MemorySettingsStore::failing(),
        pointer,
        RecordingSink::default(),
        CompanionConfig::default(),
    );
    let task = tokio::spawn(companion.run());

    handle.send(Command::UpdateSetting(SettingsPatch {
        work: Some(600),
        ..Default::default()
    }));
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    assert!(companion
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, Event::SettingsPersistFailed { .. })));
    assert_eq!(companion.session_state().seconds_remaining, 600);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_shuts_down() {
    let (companion, handle, _pointer) = companion(SessionSettings::default());
    let task = tokio::spawn(companion.run());
    handle.send(Command::StartStop);
    drop(handle);

    let companion = task.await.unwrap();
    assert!(!companion.session_state().is_running);
    assert_eq!(companion.attention_snapshot().escalation_at_ms, None);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_step_down() {
    let (companion, handle, pointer) = companion(SessionSettings::default());
    let task = tokio::spawn(companion.run());

    handle.send(Command::StartStop);
    tokio::time::sleep(Duration::from_secs(61)).await;
    pointer.nudge();
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    assert_eq!(companion.sink().moods(), vec![Mood::Wary]);
    let snapshot = companion.attention_snapshot();
    assert_eq!(snapshot.mood, Mood::Wary);
    assert_eq!(snapshot.escalation_at_ms, None);
    assert_eq!(snapshot.step_down_at_ms, None);
    assert!(!companion.session_state().is_running);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_escalation() {
    let (companion, handle, _pointer) = companion(SessionSettings::default());
    let task = tokio::spawn(companion.run());

    handle.send(Command::StartStop);
    tokio::time::sleep(Duration::from_secs(70)).await;
    handle.shutdown();
    let companion = task.await.unwrap();

    let snapshot = companion.attention_snapshot();
    assert_eq!(snapshot.mood, Mood::Wary);
    assert_eq!(snapshot.escalation_at_ms, None);
    assert_eq!(snapshot.step_down_at_ms, None);
    assert!(!companion.session_state().is_running);
}
