// Session state machine for one script request
//
// Owns the only timer that may run for a request. Each state carries its
// own timer handle, so replacing the state drops (and cancels) the old
// timer before the next one starts.
//
// State Diagram:
//
//   [Idle] ──on_request──▶ [AwaitingContent] ──on_content──▶ [Revealing]
//     ▲                      │  (phrase timer)                  │ (reveal timer)
//     │                      │                                  │
//     │◀────on_failure───────┘                                  │ on_reveal_complete
//     │                                                         ▼
//     │◀──────────────cancel (any state)──────────────────── [Done]
//                                                               │
//                 [Revealing] ◀──────────replay─────────────────┘
//
// on_request from Done starts a new request. on_request while a request is
// in flight or revealing is refused.

use crate::config::RevealConfig;
use crate::document::Document;
use crate::reveal::{PhraseHandle, PhraseRotator, RevealEvent, RevealHandle, RevealScheduler};
use tokio::sync::mpsc;

/// Capacity of the event channel between the timers and the host
const EVENT_BUFFER: usize = 256;

/// Observable session state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    /// Request sent, rotating status phrases
    AwaitingContent,
    /// Document known, widening the visible prefix
    Revealing,
    /// Whole document visible; copy and export are available
    Done,
}

/// State plus the timer that belongs to it
enum Stage {
    Idle,
    #[allow(dead_code)] // Held for its Drop: stops the rotator
    AwaitingContent(PhraseHandle),
    Revealing(RevealHandle),
    Done(Document),
}

/// Drives one request from "waiting" through "revealing" to "done"
///
/// Must be created and used inside a tokio runtime.
pub struct Session {
    stage: Stage,
    scheduler: RevealScheduler,
    rotator: PhraseRotator,
}

impl Session {
    /// Create an idle session and the receiver for its timer events
    pub fn new(config: &RevealConfig) -> (Self, mpsc::Receiver<RevealEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let session = Self {
            stage: Stage::Idle,
            scheduler: RevealScheduler::from_config(config, tx.clone()),
            rotator: PhraseRotator::from_config(config, tx),
        };
        (session, rx)
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        match self.stage {
            Stage::Idle => SessionState::Idle,
            Stage::AwaitingContent(_) => SessionState::AwaitingContent,
            Stage::Revealing(_) => SessionState::Revealing,
            Stage::Done(_) => SessionState::Done,
        }
    }

    /// Whether the host should show the typing cursor
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state(),
            SessionState::AwaitingContent | SessionState::Revealing
        )
    }

    /// Fully revealed document, available once the reveal is done
    pub fn document(&self) -> Option<&Document> {
        match &self.stage {
            Stage::Done(doc) => Some(doc),
            _ => None,
        }
    }

    /// Characters currently revealed (0 outside of a reveal)
    pub fn revealed(&self) -> usize {
        match &self.stage {
            Stage::Revealing(handle) => handle.revealed(),
            Stage::Done(doc) => doc.char_len(),
            _ => 0,
        }
    }

    /// Request sent - start rotating status phrases
    ///
    /// Returns false (and changes nothing) while a request is already in
    /// flight or being revealed.
    pub fn on_request(&mut self) -> bool {
        if self.is_busy() {
            tracing::debug!(state = ?self.state(), "Request refused, session busy");
            return false;
        }
        self.stage = Stage::AwaitingContent(self.rotator.start());
        true
    }

    /// Generation finished - stop the phrases, start revealing
    pub fn on_content(&mut self, document: Document) -> bool {
        if self.state() != SessionState::AwaitingContent {
            tracing::warn!(state = ?self.state(), "Content arrived with no pending request");
            return false;
        }
        // Drop the phrase timer before the reveal timer exists
        self.stage = Stage::Idle;
        self.stage = Stage::Revealing(self.scheduler.start(document));
        true
    }

    /// Generation failed - back to idle
    pub fn on_failure(&mut self) -> bool {
        if self.state() != SessionState::AwaitingContent {
            return false;
        }
        self.stage = Stage::Idle;
        true
    }

    /// Whether a timer event belongs to the current state
    ///
    /// Frames and completions are only current while the loop that sent
    /// them is the one revealing; a replay leaves the old run's queued
    /// frames on the channel and they must not be shown.
    pub fn accepts(&self, event: &RevealEvent) -> bool {
        match (&self.stage, event) {
            (Stage::AwaitingContent(_), RevealEvent::Status(_)) => true,
            (Stage::Revealing(handle), RevealEvent::Frame(frame)) => frame.run == handle.run(),
            (Stage::Revealing(handle), RevealEvent::Completed { run, .. }) => *run == handle.run(),
            _ => false,
        }
    }

    /// Reveal loop `run` reported completion
    ///
    /// Ignored unless `run` is the current loop and it really finished, so
    /// a completion queued by a loop that has since been restarted cannot
    /// end the new one.
    pub fn on_reveal_complete(&mut self, run: u64) -> bool {
        let finished = match &self.stage {
            Stage::Revealing(handle) if handle.run() == run && !handle.is_active() => {
                handle.target()
            }
            _ => return false,
        };
        self.stage = Stage::Done(finished);
        true
    }

    /// Reveal the current document again from the start
    pub fn replay(&mut self) -> bool {
        self.stage = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Revealing(handle) => {
                let target = handle.target();
                Stage::Revealing(handle.restart(target))
            }
            Stage::Done(doc) => Stage::Revealing(self.scheduler.start(doc)),
            other => {
                self.stage = other;
                return false;
            }
        };
        true
    }

    /// Stop whatever timer is running and return to idle
    pub fn cancel(&mut self) {
        if let Stage::Revealing(handle) = &self.stage {
            handle.cancel();
        }
        self.stage = Stage::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time;

    fn config() -> RevealConfig {
        RevealConfig {
            phrases: vec!["one".into(), "two".into()],
            ..RevealConfig::default()
        }
    }

    /// Drain events until a reveal completes, returning its run and last markup
    async fn finish(rx: &mut mpsc::Receiver<RevealEvent>) -> (u64, String) {
        let mut markup = String::new();
        loop {
            match rx.recv().await {
                Some(RevealEvent::Frame(frame)) => markup = frame.markup,
                Some(RevealEvent::Completed { run, .. }) => return (run, markup),
                Some(RevealEvent::Status(_)) => {}
                None => panic!("channel closed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state_is_idle() {
        let (session, _rx) = Session::new(&config());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.document().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_flow() {
        let (mut session, mut rx) = Session::new(&config());

        assert!(session.on_request());
        assert_eq!(session.state(), SessionState::AwaitingContent);
        assert_eq!(rx.recv().await, Some(RevealEvent::Status("one".into())));

        assert!(session.on_content(Document::from("# Hi")));
        assert_eq!(session.state(), SessionState::Revealing);

        let (run, markup) = finish(&mut rx).await;
        assert_eq!(markup, "<h1>Hi</h1>\n");

        assert!(session.on_reveal_complete(run));
        assert_eq!(session.state(), SessionState::Done);
        assert_eq!(session.document(), Some(&Document::from("# Hi")));
        assert_eq!(session.revealed(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phrases_stop_when_content_arrives() {
        let (mut session, mut rx) = Session::new(&config());
        session.on_request();
        assert_eq!(rx.recv().await, Some(RevealEvent::Status("one".into())));

        session.on_content(Document::from("a".repeat(3000)));
        // 10s of reveal ticks: frames only, no more status phrases
        time::sleep(Duration::from_secs(10)).await;
        while let Ok(event) = rx.try_recv() {
            assert!(
                !matches!(event, RevealEvent::Status(_)),
                "phrase timer still running"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_refused_while_busy() {
        let (mut session, _rx) = Session::new(&config());
        assert!(session.on_request());
        assert!(!session.on_request());

        session.on_content(Document::from("abc def"));
        assert!(!session.on_request());
        assert_eq!(session.state(), SessionState::Revealing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_content_without_request_is_ignored() {
        let (mut session, _rx) = Session::new(&config());
        assert!(!session.on_content(Document::from("late")));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_returns_to_idle() {
        let (mut session, mut rx) = Session::new(&config());
        session.on_request();
        assert!(session.on_failure());
        assert_eq!(session.state(), SessionState::Idle);

        // Drain the first phrase, then nothing else arrives
        time::sleep(Duration::from_secs(10)).await;
        let mut statuses = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, RevealEvent::Status(_)));
            statuses += 1;
        }
        assert!(statuses <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_is_ignored() {
        let (mut session, mut rx) = Session::new(&config());
        session.on_request();
        session.on_content(Document::from("short"));
        let (first, _) = finish(&mut rx).await;

        // Replay before handling the first completion
        assert!(session.replay());
        assert!(!session.on_reveal_complete(first));
        assert_eq!(session.state(), SessionState::Revealing);

        let (second, _) = finish(&mut rx).await;
        assert_ne!(first, second);
        assert!(session.on_reveal_complete(second));
        assert_eq!(session.state(), SessionState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_from_done() {
        let (mut session, mut rx) = Session::new(&config());
        session.on_request();
        session.on_content(Document::from("abcdef"));
        let (run, _) = finish(&mut rx).await;
        session.on_reveal_complete(run);

        assert!(session.replay());
        assert_eq!(session.state(), SessionState::Revealing);
        assert_eq!(finish(&mut rx).await.1, "abcdef\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_skips_frames_of_previous_run() {
        let (mut session, mut rx) = Session::new(&config());
        session.on_request();
        session.on_content(Document::from("x".repeat(300)));

        // Let the first run queue a few frames, then replay over them
        time::sleep(Duration::from_millis(61)).await;
        assert!(session.replay());

        let mut shown = Vec::new();
        let mut stale = 0;
        while session.state() == SessionState::Revealing {
            let event = rx.recv().await.unwrap();
            if !session.accepts(&event) {
                stale += 1;
                continue;
            }
            match event {
                RevealEvent::Frame(frame) => shown.push(frame.revealed),
                RevealEvent::Completed { run, .. } => {
                    assert!(session.on_reveal_complete(run));
                }
                RevealEvent::Status(_) => unreachable!("status accepted while revealing"),
            }
        }

        assert!(stale > 0);
        assert_eq!(shown.first(), Some(&3));
        assert!(shown.windows(2).all(|w| w[0] < w[1]), "{shown:?}");
        assert_eq!(shown.last(), Some(&300));
        assert_eq!(session.state(), SessionState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_only_accepted_while_waiting() {
        let (mut session, _rx) = Session::new(&config());
        let status = RevealEvent::Status("one".into());
        assert!(!session.accepts(&status));
        session.on_request();
        assert!(session.accepts(&status));
        session.on_content(Document::from("abc"));
        assert!(!session.accepts(&status));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_needs_a_document() {
        let (mut session, _rx) = Session::new(&config());
        assert!(!session.replay());
        session.on_request();
        assert!(!session.replay());
        assert_eq!(session.state(), SessionState::AwaitingContent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_reveal() {
        let (mut session, mut rx) = Session::new(&config());
        session.on_request();
        session.on_content(Document::from("x".repeat(300)));
        loop {
            if let Some(RevealEvent::Frame(_)) = rx.recv().await {
                break;
            }
        }

        session.cancel();
        assert_eq!(session.state(), SessionState::Idle);
        time::sleep(Duration::from_secs(1)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
