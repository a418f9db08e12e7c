//! Status phrase rotation while a script is being generated
//!
//! Runs only before the first byte of the document is known. The session
//! drops the handle (and with it the timer) the moment content arrives, so
//! phrase rotation and the reveal loop never run for the same request.

use super::RevealEvent;
use crate::config::RevealConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Loading steps shown while waiting for the generation endpoint
pub const DEFAULT_PHRASES: [&str; 5] = [
    "Analyzing prompt & industry context...",
    "Retrieving successful ad structures...",
    "Injecting brand parameters...",
    "Drafting the script...",
    "Finalizing script format...",
];

#[derive(Debug, Clone)]
pub struct PhraseRotator {
    phrases: Arc<[String]>,
    every: Duration,
    events: mpsc::Sender<RevealEvent>,
}

impl PhraseRotator {
    pub fn new(phrases: Vec<String>, every: Duration, events: mpsc::Sender<RevealEvent>) -> Self {
        Self {
            phrases: phrases.into(),
            every,
            events,
        }
    }

    pub fn from_config(config: &RevealConfig, events: mpsc::Sender<RevealEvent>) -> Self {
        Self::new(config.phrases.clone(), config.phrase_interval(), events)
    }

    /// Publish the first phrase now and the next one every interval, cycling.
    pub fn start(&self) -> PhraseHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(rotate(
            self.phrases.clone(),
            self.every,
            token.clone(),
            self.events.clone(),
        ));
        PhraseHandle { token, task }
    }
}

/// Owned handle to a running phrase rotation; dropping it stops the timer
#[derive(Debug)]
pub struct PhraseHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PhraseHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PhraseHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn rotate(
    phrases: Arc<[String]>,
    every: Duration,
    token: CancellationToken,
    events: mpsc::Sender<RevealEvent>,
) {
    if phrases.is_empty() {
        return;
    }

    let mut interval = time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for phrase in phrases.iter().cycle() {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }
        if events.send(RevealEvent::Status(phrase.clone())).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::Instant;

    fn rotator(phrases: &[&str]) -> (PhraseRotator, mpsc::Receiver<RevealEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let phrases = phrases.iter().map(|p| p.to_string()).collect();
        (
            PhraseRotator::new(phrases, Duration::from_millis(2500), tx),
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotates_and_wraps() {
        let (rotator, mut rx) = rotator(&["one", "two"]);
        let started = Instant::now();
        let _handle = rotator.start();

        let mut seen = Vec::new();
        for _ in 0..3 {
            match rx.recv().await {
                Some(RevealEvent::Status(s)) => seen.push(s),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seen, vec!["one", "two", "one"]);
        assert_eq!(started.elapsed(), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_rotation() {
        let (rotator, mut rx) = rotator(&["one", "two"]);
        let handle = rotator.start();
        assert_eq!(rx.recv().await, Some(RevealEvent::Status("one".into())));
        drop(handle);

        time::sleep(Duration::from_secs(10)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_phrase_list_is_silent() {
        let (rotator, mut rx) = rotator(&[]);
        let handle = rotator.start();
        time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_finished());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
