//! Timed reveal loop
//!
//! `RevealScheduler::start` spawns one tokio task per reveal and hands back
//! the only handle that can stop it. Each tick locks the shared state,
//! advances it, renders the new prefix and publishes a `Frame`. Ticks never
//! overlap: there is a single task and missed ticks are delayed, not
//! bursted.

use super::{Frame, RevealEvent, RevealState, Tick};
use crate::config::RevealConfig;
use crate::document::Document;
use crate::render::render;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

type SharedState = Arc<Mutex<RevealState>>;

fn lock(state: &Mutex<RevealState>) -> MutexGuard<'_, RevealState> {
    // The state is a counter; a panicked holder cannot leave it torn
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts reveal loops that publish to one event channel
///
/// Every loop gets a run number, stamped on its frames, so a consumer can
/// tell frames of the current run from ones an earlier run left queued.
#[derive(Debug, Clone)]
pub struct RevealScheduler {
    step: usize,
    every: Duration,
    events: mpsc::Sender<RevealEvent>,
    /// Last run number handed out, shared by clones
    runs: Arc<AtomicU64>,
}

impl RevealScheduler {
    pub fn new(step: usize, every: Duration, events: mpsc::Sender<RevealEvent>) -> Self {
        Self {
            step: step.max(1),
            every,
            events,
            runs: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(config: &RevealConfig, events: mpsc::Sender<RevealEvent>) -> Self {
        Self::new(config.step, config.tick(), events)
    }

    /// Begin revealing `target` from an empty prefix.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&self, target: Document) -> RevealHandle {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            run,
            chars = target.char_len(),
            step = self.step,
            every_ms = self.every.as_millis() as u64,
            "Reveal started"
        );

        let state: SharedState = Arc::new(Mutex::new(RevealState::new(target)));
        let token = CancellationToken::new();
        let task = tokio::spawn(reveal_loop(
            run,
            state.clone(),
            token.clone(),
            self.step,
            self.every,
            self.events.clone(),
        ));

        RevealHandle {
            run,
            state,
            token,
            task,
            scheduler: self.clone(),
        }
    }
}

/// Owned handle to one running reveal
///
/// Dropping the handle cancels the loop, so a discarded view can never keep
/// a timer alive.
#[derive(Debug)]
pub struct RevealHandle {
    run: u64,
    state: SharedState,
    token: CancellationToken,
    task: JoinHandle<()>,
    scheduler: RevealScheduler,
}

impl RevealHandle {
    /// Stop ticking and keep the prefix revealed so far.
    ///
    /// No tick runs after this returns. Calling it again is a no-op.
    pub fn cancel(&self) {
        let was_active = lock(&self.state).cancel();
        self.token.cancel();
        if was_active {
            tracing::debug!(revealed = self.revealed(), "Reveal cancelled");
        }
    }

    /// Cancel this loop and start a fresh one over `target`
    pub fn restart(self, target: Document) -> RevealHandle {
        self.cancel();
        self.scheduler.start(target)
    }

    /// Run number stamped on this loop's events
    pub fn run(&self) -> u64 {
        self.run
    }

    /// Characters revealed so far
    pub fn revealed(&self) -> usize {
        lock(&self.state).revealed()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).is_active()
    }

    pub fn target(&self) -> Document {
        lock(&self.state).target().clone()
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Send unless the run is cancelled first
///
/// Returns false when the loop should stop: cancelled while waiting for
/// room on the channel, or the receiver is gone.
async fn publish(
    token: &CancellationToken,
    events: &mpsc::Sender<RevealEvent>,
    event: RevealEvent,
) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        sent = events.send(event) => sent.is_ok(),
    }
}

async fn reveal_loop(
    run: u64,
    state: SharedState,
    token: CancellationToken,
    step: usize,
    every: Duration,
    events: mpsc::Sender<RevealEvent>,
) {
    if token.is_cancelled() {
        return;
    }

    // Empty document: nothing to tick through
    let total = {
        let guard = lock(&state);
        guard.is_complete().then(|| guard.total())
    };
    if let Some(total) = total {
        publish(&token, &events, RevealEvent::Completed { run, total }).await;
        return;
    }

    let mut interval = time::interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let (tick, markup) = {
            let mut guard = lock(&state);
            let tick = guard.advance(step);
            let markup = match tick {
                Tick::Inactive => break,
                Tick::Advanced(_) | Tick::Completed(_) => render(guard.prefix()),
            };
            (tick, markup)
        };

        let (revealed, revealing) = match tick {
            Tick::Advanced(n) => (n, true),
            Tick::Completed(n) => (n, false),
            Tick::Inactive => break,
        };

        let frame = Frame {
            run,
            revealed,
            markup,
            revealing,
        };
        if !publish(&token, &events, RevealEvent::Frame(frame)).await {
            // Cancelled mid-send, or nobody is watching any more
            lock(&state).cancel();
            tracing::debug!(run, "Reveal stopped before publishing");
            break;
        }

        if !revealing {
            tracing::debug!(run, total = revealed, "Reveal complete");
            publish(
                &token,
                &events,
                RevealEvent::Completed {
                    run,
                    total: revealed,
                },
            )
            .await;
            break;
        }
    }
}
