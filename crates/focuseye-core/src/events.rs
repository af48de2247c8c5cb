use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::activity::CursorPosition;
use crate::attention::Mood;
use crate::session::SessionState;

/// Every outward notification produced by the engines.
/// Consumers never acknowledge them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Full session snapshot, pushed after every state-affecting operation.
    SessionUpdated {
        state: SessionState,
        at: DateTime<Utc>,
    },
    /// The attention mood changed (or was force-asserted by a phase change).
    MoodChanged {
        mood: Mood,
        previous: Mood,
        at: DateTime<Utc>,
    },
    /// Pointer moved; consumed by cursor-following UI.
    CursorMoved {
        cursor: CursorPosition,
        at: DateTime<Utc>,
    },
    /// Settings were applied in memory but could not be written to disk.
    SettingsPersistFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn session(state: SessionState) -> Self {
        Event::SessionUpdated {
            state,
            at: Utc::now(),
        }
    }

    pub fn mood(mood: Mood, previous: Mood) -> Self {
        Event::MoodChanged {
            mood,
            previous,
            at: Utc::now(),
        }
    }

    pub fn session_state(&self) -> Option<&SessionState> {
        match self {
            Event::SessionUpdated { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn new_mood(&self) -> Option<Mood> {
        match self {
            Event::MoodChanged { mood, .. } => Some(*mood),
            _ => None,
        }
    }
}

/// Anything that receives engine notifications: windows, tray, log.
pub trait NotificationSink {
    fn notify(&mut self, event: &Event);
}

/// Forwards events over an unbounded channel.
///
/// A closed receiver is not an error; the event is dropped.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&mut self, event: &Event) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!("notification receiver closed, dropping event");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    pub fn moods(&self) -> Vec<Mood> {
        self.events.iter().filter_map(Event::new_mood).collect()
    }

    pub fn last_session(&self) -> Option<&SessionState> {
        self.events.iter().rev().find_map(Event::session_state)
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}
