// TUI application state
//
// Holds the session, the prompt being edited, the latest rendered frame and
// transient UI state (scroll, cursor blink, toast). Timers and the
// generation task report back through channels the event loop owns; the
// `on_*` methods apply what they deliver.

use super::markup;
use super::palette::Palette;
use super::toast::Toast;
use adscript::config::Config;
use adscript::export::{self, ClipboardSink, DownloadSink, FileSink, SystemClipboard};
use adscript::generation::{Brief, Generated, GenerationError, HttpSource, Source};
use adscript::logging::LogBuffer;
use adscript::reveal::RevealEvent;
use adscript::session::{Session, SessionState};
use ratatui::text::Line;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Result of one generation task, tagged with its request number
pub type Fetched = (u64, Result<Generated, GenerationError>);

/// Receivers the event loop selects on
pub struct Channels {
    pub reveal: mpsc::Receiver<RevealEvent>,
    pub fetched: mpsc::Receiver<Fetched>,
}

/// Main application state for the TUI
pub struct App {
    pub config: Config,
    pub log_buffer: LogBuffer,
    pub palette: Palette,

    pub session: Session,
    fetch_tx: mpsc::Sender<Fetched>,
    fetch_task: Option<JoinHandle<()>>,
    /// Number of the latest request; older results are dropped
    request_id: u64,

    /// Source chosen on the command line, reused by every generate
    preset: Option<Source>,
    /// Flags from the command line; the prompt comes from `input`
    brief: Brief,

    /// Prompt being edited
    pub input: String,
    pub editing: bool,

    /// Current status phrase while waiting
    pub phrase: Option<String>,
    /// Styled lines of the latest frame
    pub lines: Vec<Line<'static>>,
    /// Characters shown in the latest frame
    pub revealed: usize,
    pub revealing: bool,
    pub script_id: Option<String>,

    /// First visible line when not following
    pub scroll: usize,
    /// Keep the newest line in view while revealing
    pub follow: bool,
    /// Largest useful scroll offset, updated on draw
    pub max_scroll: usize,

    pub blink: bool,
    /// Tick counter driving the spinner
    pub frame: usize,
    pub toast: Option<Toast>,
    pub should_quit: bool,

    clipboard: Box<dyn ClipboardSink + Send>,
    downloads: Box<dyn DownloadSink + Send>,
}

impl App {
    /// Create app state; must be called inside the tokio runtime
    pub fn new(
        config: Config,
        log_buffer: LogBuffer,
        preset: Option<Source>,
        brief: Brief,
    ) -> (Self, Channels) {
        let downloads = Box::new(FileSink::new(config.export_dir.clone()));
        Self::with_sinks(config, log_buffer, preset, brief, Box::new(SystemClipboard), downloads)
    }

    /// Same as `new` with explicit clipboard and download targets
    pub fn with_sinks(
        config: Config,
        log_buffer: LogBuffer,
        preset: Option<Source>,
        brief: Brief,
        clipboard: Box<dyn ClipboardSink + Send>,
        downloads: Box<dyn DownloadSink + Send>,
    ) -> (Self, Channels) {
        let (session, reveal) = Session::new(&config.reveal);
        let (fetch_tx, fetched) = mpsc::channel(4);

        // Start in prompt mode when there is nothing else to run
        let editing = preset.is_none();
        let input = brief.prompt.clone();

        let app = Self {
            config,
            log_buffer,
            palette: Palette::default(),
            session,
            fetch_tx,
            fetch_task: None,
            request_id: 0,
            preset,
            brief,
            input,
            editing,
            phrase: None,
            lines: Vec::new(),
            revealed: 0,
            revealing: false,
            script_id: None,
            scroll: 0,
            follow: true,
            max_scroll: 0,
            blink: true,
            frame: 0,
            toast: None,
            should_quit: false,
            clipboard,
            downloads,
        };
        (app, Channels { reveal, fetched })
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Label of what `g` will run
    pub fn source_label(&self) -> &'static str {
        self.preset.as_ref().map_or("backend", Source::label)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────────────────────────────────

    /// Run the preset source, or the typed prompt against the backend
    pub fn generate(&mut self) {
        if self.session.is_busy() {
            self.toast = Some(Toast::warning("Already generating"));
            return;
        }

        let source = match &self.preset {
            Some(source) => source.clone(),
            None => {
                if self.input.trim().is_empty() {
                    self.editing = true;
                    return;
                }
                let brief = Brief {
                    prompt: self.input.clone(),
                    ..self.brief.clone()
                };
                match HttpSource::new(&self.config.api_url, &self.config.generation) {
                    Ok(client) => Source::Http(client, brief),
                    Err(e) => {
                        tracing::error!("Cannot build backend client: {}", e);
                        self.toast = Some(Toast::error(e.to_string()));
                        return;
                    }
                }
            }
        };
        self.start_fetch(source);
    }

    fn start_fetch(&mut self, source: Source) {
        if !self.session.on_request() {
            return;
        }
        self.editing = false;
        self.clear_output();
        self.request_id += 1;

        let id = self.request_id;
        let tx = self.fetch_tx.clone();
        tracing::info!(source = source.label(), request = id, "Generation started");
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch().await;
            let _ = tx.send((id, result)).await;
        }));
    }

    /// Generation task finished
    pub fn on_fetched(&mut self, (id, result): Fetched) {
        if id != self.request_id || self.state() != SessionState::AwaitingContent {
            tracing::debug!(request = id, "Dropping stale generation result");
            return;
        }
        self.fetch_task = None;
        self.phrase = None;

        match result {
            Ok(generated) => {
                if let Some(warning) = &generated.warning {
                    self.toast = Some(Toast::warning(warning.message()));
                }
                self.script_id = generated.script_id;
                self.session.on_content(generated.document);
            }
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                self.session.on_failure();
                self.toast = Some(Toast::error(e.to_string()));
            }
        }
    }

    /// Timer event from the session
    ///
    /// Events queued by a timer that has since been cancelled or replaced
    /// are dropped.
    pub fn on_reveal_event(&mut self, event: RevealEvent) {
        if !self.session.accepts(&event) {
            return;
        }
        match event {
            RevealEvent::Status(phrase) => self.phrase = Some(phrase),
            RevealEvent::Frame(frame) => {
                self.lines = markup::to_lines(&frame.markup, &self.palette);
                self.revealed = frame.revealed;
                self.revealing = frame.revealing;
            }
            RevealEvent::Completed { run, total } => {
                if self.session.on_reveal_complete(run) {
                    self.revealing = false;
                    tracing::info!(chars = total, "Reveal complete");
                }
            }
        }
    }

    /// Stop generating or revealing
    pub fn cancel(&mut self) {
        if !self.session.is_busy() {
            return;
        }
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        self.session.cancel();
        self.phrase = None;
        self.revealing = false;
        self.toast = Some(Toast::warning("Cancelled"));
        tracing::info!("Cancelled by user");
    }

    /// Reveal the finished (or revealing) script again
    pub fn replay(&mut self) {
        if self.session.replay() {
            self.clear_output();
        }
    }

    fn clear_output(&mut self) {
        self.lines.clear();
        self.revealed = 0;
        self.revealing = false;
        self.phrase = None;
        self.scroll = 0;
        self.follow = true;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Copy / export
    // ─────────────────────────────────────────────────────────────────────

    pub fn copy(&mut self, markdown: bool) {
        let Some(doc) = self.session.document() else {
            self.toast = Some(Toast::warning("Nothing to copy yet"));
            return;
        };

        let result = if markdown {
            export::copy_markdown(doc, self.clipboard.as_mut())
        } else {
            export::copy_plain(doc, self.clipboard.as_mut())
        };

        self.toast = Some(match result {
            Ok(()) if markdown => Toast::success("Copied as Markdown!"),
            Ok(()) => Toast::success("Copied to clipboard!"),
            Err(e) => {
                tracing::warn!("Copy failed: {:#}", e);
                Toast::error(format!("{:#}", e))
            }
        });
    }

    pub fn export(&mut self) {
        let Some(doc) = self.session.document() else {
            self.toast = Some(Toast::warning("Nothing to export yet"));
            return;
        };

        let download = export::word_document(doc, &self.config.export);
        self.toast = Some(match self.downloads.deliver(&download) {
            Ok(path) => Toast::success(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::warn!("Export failed: {:#}", e);
                Toast::error(format!("{:#}", e))
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Prompt editing
    // ─────────────────────────────────────────────────────────────────────

    pub fn start_editing(&mut self) {
        if self.preset.is_some() {
            self.toast = Some(Toast::warning("Script source set on the command line"));
            return;
        }
        if !self.session.is_busy() {
            self.editing = true;
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn submit_prompt(&mut self) {
        if self.input.trim().is_empty() {
            self.toast = Some(Toast::warning("Type a brief first"));
            return;
        }
        self.editing = false;
        self.generate();
    }

    // ─────────────────────────────────────────────────────────────────────
    // View
    // ─────────────────────────────────────────────────────────────────────

    /// Periodic tick: cursor blink and toast expiry
    pub fn tick(&mut self) {
        self.blink = !self.blink;
        self.frame = self.frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let from = if self.follow { self.max_scroll } else { self.scroll };
        self.follow = false;
        self.scroll = from.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        if self.follow {
            return;
        }
        self.scroll = (self.scroll + lines).min(self.max_scroll);
        if self.scroll == self.max_scroll {
            self.follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.follow = false;
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    /// Latest warning or error from the log, for the status bar
    pub fn latest_problem(&self) -> Option<String> {
        self.log_buffer.latest_problem().map(|e| e.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adscript::export::Download;
    use adscript::generation::SAMPLE_SCRIPT;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<String>>>);

    impl ClipboardSink for Shared {
        fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    impl DownloadSink for Shared {
        fn deliver(&mut self, download: &Download) -> anyhow::Result<PathBuf> {
            self.0.lock().unwrap().push(download.file_name.clone());
            Ok(PathBuf::from("/out").join(&download.file_name))
        }
    }

    fn demo_app() -> (App, Channels, Shared) {
        let shared = Shared::default();
        let (app, channels) = App::with_sinks(
            Config::default(),
            LogBuffer::new(),
            Some(Source::Demo(Duration::from_millis(800))),
            Brief::default(),
            Box::new(shared.clone()),
            Box::new(shared.clone()),
        );
        (app, channels, shared)
    }

    /// Feed channel events into the app until the session settles
    async fn run_until_done(app: &mut App, channels: &mut Channels) {
        while app.state() != SessionState::Done {
            tokio::select! {
                Some(fetched) = channels.fetched.recv() => app.on_fetched(fetched),
                Some(event) = channels.reveal.recv() => app.on_reveal_event(event),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_generate_reveal_copy_export() {
        let (mut app, mut channels, shared) = demo_app();
        assert!(!app.editing);

        app.generate();
        assert_eq!(app.state(), SessionState::AwaitingContent);

        run_until_done(&mut app, &mut channels).await;
        assert!(!app.revealing);
        assert_eq!(app.revealed, SAMPLE_SCRIPT.chars().count());
        assert!(!app.lines.is_empty());

        app.copy(false);
        app.copy(true);
        app.export();

        let recorded = shared.0.lock().unwrap().clone();
        assert_eq!(recorded.len(), 3);
        assert!(!recorded[0].contains("**"));
        assert_eq!(recorded[1], SAMPLE_SCRIPT);
        assert_eq!(recorded[2], "adscript-script.doc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_mid_reveal_never_goes_backwards() {
        let (mut app, mut channels, _shared) = demo_app();
        app.generate();
        while app.revealed == 0 {
            tokio::select! {
                Some(fetched) = channels.fetched.recv() => app.on_fetched(fetched),
                Some(event) = channels.reveal.recv() => app.on_reveal_event(event),
            }
        }

        // Old run keeps queueing frames until the replay
        tokio::time::sleep(Duration::from_millis(61)).await;
        app.replay();
        assert_eq!(app.revealed, 0);

        let mut seen = Vec::new();
        while app.state() != SessionState::Done {
            let event = channels.reveal.recv().await.unwrap();
            app.on_reveal_event(event);
            seen.push(app.revealed);
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert_eq!(app.revealed, SAMPLE_SCRIPT.chars().count());
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_before_done_is_refused() {
        let (mut app, _channels, shared) = demo_app();
        app.copy(false);
        app.export();
        assert!(shared.0.lock().unwrap().is_empty());
        assert!(app.toast.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_waiting_drops_result() {
        let (mut app, mut channels, _shared) = demo_app();
        app.generate();
        app.cancel();
        assert_eq!(app.state(), SessionState::Idle);

        tokio::time::sleep(Duration::from_secs(2)).await;
        // Task was aborted; nothing reaches the app
        assert!(channels.fetched.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_ignored() {
        let (mut app, _channels, _shared) = demo_app();
        app.generate();
        app.on_fetched((
            99,
            Ok(Generated::local(adscript::Document::from("other"))),
        ));
        assert_eq!(app.state(), SessionState::AwaitingContent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_shows_error_and_returns_to_idle() {
        let (mut app, _channels, _shared) = demo_app();
        app.generate();
        let id = app.request_id;
        app.on_fetched((
            id,
            Err(GenerationError::Server {
                status: 500,
                message: "Server error (500)".into(),
            }),
        ));
        assert_eq!(app.state(), SessionState::Idle);
        assert_eq!(app.toast.as_ref().unwrap().message, "Server error (500)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_mode_without_preset() {
        let (mut app, _channels) = App::with_sinks(
            Config::default(),
            LogBuffer::new(),
            None,
            Brief::default(),
            Box::new(Shared::default()),
            Box::new(Shared::default()),
        );
        assert!(app.editing);

        app.submit_prompt();
        assert_eq!(app.state(), SessionState::Idle);

        for c in "Eid".chars() {
            app.push_char(c);
        }
        app.pop_char();
        assert_eq!(app.input, "Ei");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_leaves_and_rejoins_follow() {
        let (mut app, _channels, _shared) = demo_app();
        app.max_scroll = 10;

        app.scroll_up(3);
        assert!(!app.follow);
        assert_eq!(app.scroll, 7);

        app.scroll_down(5);
        assert!(app.follow);
    }
}
