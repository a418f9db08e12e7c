// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, session events)
// - Rendering the UI

pub mod app;
mod markup;
mod palette;
mod toast;
mod ui;

use adscript::config::Config;
use adscript::generation::{Brief, Source};
use adscript::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, Channels};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// Lines moved by PageUp / PageDown
const PAGE: usize = 10;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop and restores the terminal,
/// even when the loop fails. With a preset source the first generation
/// starts immediately.
pub async fn run_tui(
    config: Config,
    log_buffer: LogBuffer,
    source: Option<Source>,
    brief: Brief,
) -> Result<()> {
    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let autostart = source.is_some();
    let (mut app, mut channels) = App::new(config, log_buffer, source, brief);
    if autostart {
        app.generate();
    }

    let result = run_event_loop(&mut terminal, &mut app, &mut channels).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on keyboard input, the redraw tick, session timer events and
/// finished generation tasks, redrawing after each.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    channels: &mut Channels,
) -> Result<()> {
    // Cursor blink and toast expiry
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = tick_interval.tick() => app.tick(),

            Some(event) = channels.reveal.recv() => app.on_reveal_event(event),

            Some(fetched) = channels.fetched.recv() => app.on_fetched(fetched),
        }

        if app.should_quit {
            break;
        }
    }

    app.cancel();
    Ok(())
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.editing {
        handle_prompt_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('g') => app.generate(),
        KeyCode::Char('i') | KeyCode::Char('/') => app.start_editing(),
        KeyCode::Char('c') => app.copy(false),
        KeyCode::Char('m') => app.copy(true),
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('r') => app.replay(),
        KeyCode::Char('x') => app.cancel(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::PageDown => app.scroll_down(PAGE),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_prompt_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Esc => app.editing = false,
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}
