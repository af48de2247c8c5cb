//! Single-task driver for both engines.
//!
//! All engine mutation happens inside one `select!` loop: commands, the
//! session countdown deadline, the attention timer deadlines and the
//! sampling interval are handled one at a time, each to completion before
//! the next is polled. Engine timers are plain deadlines, so re-computing
//! them every iteration is all the cancellation the loop needs.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::activity::{ActivitySampler, PointerSource, SamplerConfig, WindowBounds};
use crate::attention::{AttentionConfig, AttentionEngine, AttentionSnapshot, Mood};
use crate::command::Command;
use crate::events::{Event, NotificationSink};
use crate::session::{SessionEngine, SessionState};
use crate::storage::SettingsRepository;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanionConfig {
    pub attention: AttentionConfig,
    pub sampler: SamplerConfig,
    /// Window the cursor events are reported relative to.
    pub anchor: Option<WindowBounds>,
}

#[derive(Debug)]
enum Control {
    Command(Command),
    Shutdown,
}

/// Cloneable sender for external commands.
#[derive(Debug, Clone)]
pub struct CompanionHandle {
    tx: mpsc::UnboundedSender<Control>,
}

impl CompanionHandle {
    /// Queue a command. Returns false once the driver has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(Control::Command(command)).is_ok()
    }

    /// Parse and queue a raw JSON action; invalid actions are dropped.
    pub fn send_action(&self, action: &Value) -> bool {
        match Command::parse(action) {
            Ok(command) => self.send(command),
            Err(e) => {
                debug!(error = %e, "ignoring invalid command");
                false
            }
        }
    }

    /// Ask the driver to cancel its timers and return.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Control::Shutdown);
    }
}

pub struct Companion<R, P, S> {
    session: SessionEngine,
    attention: AttentionEngine,
    sampler: ActivitySampler<P>,
    sampler_config: SamplerConfig,
    repo: R,
    sink: S,
    rx: mpsc::UnboundedReceiver<Control>,
    origin: Instant,
}

impl<R, P, S> Companion<R, P, S>
where
    R: SettingsRepository,
    P: PointerSource,
    S: NotificationSink,
{
    /// Build the engines, loading settings once from `repo`.
    pub fn new(repo: R, pointer: P, sink: S, config: CompanionConfig) -> (Self, CompanionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sampler = ActivitySampler::new(pointer);
        sampler.set_anchor(config.anchor);
        let companion = Self {
            session: SessionEngine::from_repository(&repo),
            attention: AttentionEngine::new(config.attention, 0),
            sampler,
            sampler_config: config.sampler,
            repo,
            sink,
            rx,
            origin: Instant::now(),
        };
        (companion, CompanionHandle { tx })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn mood(&self) -> Mood {
        self.attention.mood()
    }

    pub fn attention_snapshot(&self) -> AttentionSnapshot {
        self.attention.snapshot()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Milliseconds since the driver was created.
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    // ── Event handlers ───────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) {
        debug!(command = command.kind(), "applying command");
        let now = self.now_ms();
        let events = match command {
            Command::StartStop => vec![self.session.toggle(now)],
            Command::Reset => vec![self.session.reset()],
            Command::ChangeSession(phase) => vec![self.session.change_phase(phase)],
            Command::UpdateSetting(patch) => self.session.update_settings(&patch, &mut self.repo),
            Command::GetState => vec![self.session.snapshot()],
        };
        self.dispatch(events);
    }

    pub fn tick_session(&mut self) {
        let now = self.now_ms();
        if let Some(event) = self.session.tick(now) {
            self.dispatch(vec![event]);
        }
    }

    pub fn fire_attention_timers(&mut self) {
        let now = self.now_ms();
        let events = self.attention.fire_due_timers(now);
        self.dispatch(events);
    }

    pub fn sample_activity(&mut self) {
        let sample = self.sampler.sample();
        if let Some(cursor) = sample.cursor {
            self.sink.notify(&Event::CursorMoved {
                cursor,
                at: chrono::Utc::now(),
            });
        }
        let now = self.now_ms();
        let events = self.attention.on_activity_sample(sample.moved, now);
        self.dispatch(events);
    }

    /// Run until every handle is dropped or `shutdown` is requested.
    ///
    /// Returns the companion so callers can inspect the final state.
    pub async fn run(mut self) -> Self {
        info!(
            phase = self.session.phase().as_str(),
            mood = self.attention.mood().as_str(),
            "companion started"
        );
        self.dispatch(vec![self.session.snapshot()]);

        let mut sampling = time::interval(self.sampler_config.interval());
        sampling.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let session_due = self.session.next_deadline().map(|ms| self.instant_at(ms));
            let attention_due = self.attention.next_deadline().map(|ms| self.instant_at(ms));

            tokio::select! {
                biased;
                control = self.rx.recv() => match control {
                    Some(Control::Command(command)) => self.apply(command),
                    Some(Control::Shutdown) | None => break,
                },
                _ = sleep_until_opt(session_due) => self.tick_session(),
                _ = sleep_until_opt(attention_due) => self.fire_attention_timers(),
                _ = sampling.tick() => self.sample_activity(),
            }
        }

        self.shutdown();
        self
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn shutdown(&mut self) {
        let event = self.session.stop();
        self.sink.notify(&event);
        self.attention.cancel_timers();
        info!("companion stopped");
    }

    /// Notify the sink and forward session phases to the attention engine.
    fn dispatch(&mut self, events: Vec<Event>) {
        let now = self.now_ms();
        for event in events {
            self.sink.notify(&event);
            if let Event::SessionUpdated { state, .. } = &event {
                for mood_event in self.attention.on_session_phase_changed(state.phase, now) {
                    self.sink.notify(&mood_event);
                }
            }
        }
    }

    fn instant_at(&self, ms: u64) -> Instant {
        self.origin + Duration::from_millis(ms)
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
