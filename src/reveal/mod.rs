//! Progressive reveal of a finished document
//!
//! The text is already complete when the reveal starts; this module widens
//! the visible prefix a few characters at a time to imitate live
//! generation. `RevealState` is the pure counter, `scheduler` drives it on a
//! timer, and `phrases` rotates status lines while no text exists yet.

pub mod phrases;
pub mod scheduler;

pub use phrases::{PhraseHandle, PhraseRotator};
pub use scheduler::{RevealHandle, RevealScheduler};

use crate::document::Document;
use std::time::Duration;

/// Characters revealed per tick
pub const DEFAULT_STEP: usize = 3;

/// Delay between reveal ticks
pub const DEFAULT_TICK: Duration = Duration::from_millis(15);

/// Delay between status phrases while waiting for content
pub const DEFAULT_PHRASE_INTERVAL: Duration = Duration::from_millis(2500);

/// One rendered tick, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Reveal run that produced this frame
    pub run: u64,
    /// Characters of the target now visible
    pub revealed: usize,
    /// `render()` of the visible prefix
    pub markup: String,
    /// Drives the blinking cursor; false on the final frame
    pub revealing: bool,
}

/// Everything the timers publish to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// Status phrase while the document is still being generated
    Status(String),
    /// New prefix after a reveal tick
    Frame(Frame),
    /// Reveal reached the end of the document (sent once per run)
    Completed { run: u64, total: usize },
}

/// Result of advancing the reveal by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Prefix grew and there is more to show
    Advanced(usize),
    /// Prefix now covers the whole document
    Completed(usize),
    /// Already finished or cancelled, nothing changed
    Inactive,
}

/// Revealed prefix of a target document
///
/// `revealed` only ever grows and never passes the target length. `active`
/// turns false exactly once: when the end is reached or on cancel.
#[derive(Debug, Clone)]
pub struct RevealState {
    target: Document,
    total: usize,
    revealed: usize,
    /// Byte offset of the end of the revealed prefix
    end: usize,
    active: bool,
}

impl RevealState {
    /// Start at an empty prefix. An empty target is complete from the start.
    pub fn new(target: Document) -> Self {
        let total = target.char_len();
        Self {
            target,
            total,
            revealed: 0,
            end: 0,
            active: total > 0,
        }
    }

    pub fn target(&self) -> &Document {
        &self.target
    }

    /// Length of the target in characters
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.revealed == self.total
    }

    /// Currently visible text
    pub fn prefix(&self) -> &str {
        &self.target.as_str()[..self.end]
    }

    /// Reveal `step` more characters, clamped to the end of the target.
    pub fn advance(&mut self, step: usize) -> Tick {
        if !self.active {
            return Tick::Inactive;
        }

        let rest = &self.target.as_str()[self.end..];
        match rest.char_indices().nth(step) {
            Some((offset, _)) => {
                self.end += offset;
                self.revealed += step;
            }
            None => {
                self.end = self.target.as_str().len();
                self.revealed = self.total;
            }
        }

        if self.is_complete() {
            self.active = false;
            Tick::Completed(self.revealed)
        } else {
            Tick::Advanced(self.revealed)
        }
    }

    /// Stop where we are. Returns whether the state was still active.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}
