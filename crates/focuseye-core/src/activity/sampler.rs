//! Pointer activity sampling.
//!
//! Turns absolute pointer positions into the boolean "movement occurred"
//! signal the attention engine consumes, plus a cursor event for
//! cursor-following UI. Query failures never escape the sampler.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, Result};

/// Absolute pointer position in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle the cursor position is reported relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowBounds {
    pub fn contains(&self, p: PointerPosition) -> bool {
        p.x >= self.x
            && p.x <= self.x.saturating_add(self.width)
            && p.y >= self.y
            && p.y <= self.y.saturating_add(self.height)
    }
}

/// Cursor event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPosition {
    /// Relative to the anchor window, or global without one.
    pub x: i32,
    pub y: i32,
    pub is_in_window: bool,
    pub global_x: i32,
    pub global_y: i32,
}

/// Platform pointer query.
pub trait PointerSource {
    fn position(&mut self) -> Result<PointerPosition>;
}

/// A pointer that never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPointer(pub PointerPosition);

impl PointerSource for FixedPointer {
    fn position(&mut self) -> Result<PointerPosition> {
        Ok(self.0)
    }
}

/// Replays queued positions (or failures), then holds the last position.
#[derive(Debug, Default)]
pub struct ScriptedPointer {
    queue: VecDeque<Option<PointerPosition>>,
    last: PointerPosition,
}

impl ScriptedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, position: PointerPosition) -> &mut Self {
        self.queue.push_back(Some(position));
        self
    }

    /// Queue a failed query.
    pub fn push_failure(&mut self) -> &mut Self {
        self.queue.push_back(None);
        self
    }
}

impl PointerSource for ScriptedPointer {
    fn position(&mut self) -> Result<PointerPosition> {
        match self.queue.pop_front() {
            Some(Some(p)) => {
                self.last = p;
                Ok(p)
            }
            Some(None) => Err(CoreError::Pointer("scripted failure".into())),
            None => Ok(self.last),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Sampling period (default: 100ms)
    pub interval_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

impl SamplerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Outcome of one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub moved: bool,
    /// Present only when the pointer moved.
    pub cursor: Option<CursorPosition>,
}

pub struct ActivitySampler<P> {
    source: P,
    last: PointerPosition,
    anchor: Option<WindowBounds>,
    failures: u64,
}

impl<P: PointerSource> ActivitySampler<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            last: PointerPosition::default(),
            anchor: None,
            failures: 0,
        }
    }

    pub fn with_anchor(mut self, anchor: WindowBounds) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn set_anchor(&mut self, anchor: Option<WindowBounds>) {
        self.anchor = anchor;
    }

    /// Number of failed pointer queries so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Compare the current position to the previous sample.
    ///
    /// A failed query counts as "no movement" and leaves the previous
    /// sample in place.
    pub fn sample(&mut self) -> Sample {
        let current = match self.source.position() {
            Ok(p) => p,
            Err(e) => {
                self.failures += 1;
                warn!(error = %e, failures = self.failures, "pointer query failed");
                return Sample {
                    moved: false,
                    cursor: None,
                };
            }
        };

        if current == self.last {
            return Sample {
                moved: false,
                cursor: None,
            };
        }
        self.last = current;
        Sample {
            moved: true,
            cursor: Some(self.cursor(current)),
        }
    }

    fn cursor(&self, p: PointerPosition) -> CursorPosition {
        match self.anchor {
            Some(bounds) => CursorPosition {
                x: p.x.saturating_sub(bounds.x),
                y: p.y.saturating_sub(bounds.y),
                is_in_window: bounds.contains(p),
                global_x: p.x,
                global_y: p.y,
            },
            None => CursorPosition {
                x: p.x,
                y: p.y,
                is_in_window: false,
                global_x: p.x,
                global_y: p.y,
            },
        }
    }
}
