// UI rendering
//
// Layout, top to bottom:
//   title bar   - name, version, session state, current status phrase
//   prompt box  - only while editing the brief
//   script      - the revealed script, blinking cursor while revealing
//   status bar  - key hints, latest warning from the log
// plus the toast overlay.

use super::app::App;
use adscript::config::VERSION;
use adscript::session::SessionState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Cursor appended to the last line while revealing
const CURSOR: &str = "▌";

/// Spinner frames shown next to the status phrase
const SPINNER: [&str; 6] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴"];

pub fn draw(f: &mut Frame, app: &mut App) {
    let mut constraints = vec![Constraint::Length(1)];
    if app.editing {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(3));
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    render_title(f, chunks[0], app);
    let body = if app.editing {
        render_prompt(f, chunks[1], app);
        chunks[2]
    } else {
        chunks[1]
    };
    render_script(f, body, app);
    render_status(f, chunks[chunks.len() - 1], app);

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.palette);
    }
}

fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::AwaitingContent => "generating",
        SessionState::Revealing => "writing",
        SessionState::Done => "done",
    }
}

fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let palette = &app.palette;
    let mut spans = vec![
        Span::styled(
            format!(" adscript v{} ", VERSION),
            Style::default()
                .fg(palette.title)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(palette.border)),
        Span::raw(format!(
            "{} ({})",
            state_label(app.state()),
            app.source_label()
        )),
    ];

    if let Some(id) = &app.script_id {
        spans.push(Span::styled(
            format!("  #{}", id),
            Style::default().fg(palette.muted),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_prompt(f: &mut Frame, area: Rect, app: &App) {
    let cursor = if app.blink { CURSOR } else { " " };
    let prompt = Paragraph::new(Line::from(vec![
        Span::raw(app.input.clone()),
        Span::styled(cursor, Style::default().fg(app.palette.highlight)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(app.palette.highlight))
            .title(" Brief (Enter to generate, Esc to close) "),
    );
    f.render_widget(prompt, area);
}

fn render_script(f: &mut Frame, area: Rect, app: &mut App) {
    let palette = app.palette;
    let mut lines = app.lines.clone();

    if app.state() == SessionState::AwaitingContent && lines.is_empty() {
        let frame = SPINNER[app.frame % SPINNER.len()];
        let phrase = app.phrase.as_deref().unwrap_or("Generating...");
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", frame), Style::default().fg(palette.highlight)),
            Span::styled(
                phrase.to_string(),
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    } else if app.state() == SessionState::Idle && lines.is_empty() {
        let hint = if app.editing {
            "Describe the product, audience and offer above."
        } else {
            "Press g to generate a script."
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(palette.muted),
        )));
    }

    if app.revealing && app.blink {
        let cursor = Span::styled(CURSOR, Style::default().fg(palette.highlight));
        match lines.last_mut() {
            Some(last) => last.spans.push(cursor),
            None => lines.push(Line::from(cursor)),
        }
    }

    // Inner size: borders take two rows and two columns
    let height = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(2).max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    app.max_scroll = rows.saturating_sub(height);
    let offset = if app.follow {
        app.max_scroll
    } else {
        app.scroll.min(app.max_scroll)
    };

    let title = if app.revealed > 0 {
        format!(" Script ({} chars) ", app.revealed)
    } else {
        " Script ".to_string()
    };

    let script = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.border))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    f.render_widget(script, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let palette = &app.palette;
    let hints = if app.editing {
        " Enter generate │ Esc close"
    } else {
        match app.state() {
            SessionState::Done => {
                " c copy │ m markdown │ e export │ r replay │ g new │ q quit"
            }
            SessionState::AwaitingContent | SessionState::Revealing => {
                " x cancel │ r replay │ ↑↓ scroll │ q quit"
            }
            SessionState::Idle => " g generate │ i brief │ q quit",
        }
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(palette.status_bar))];
    if let Some(problem) = app.latest_problem() {
        spans.push(Span::styled("  ⚠ ", Style::default().fg(palette.warning)));
        spans.push(Span::styled(problem, Style::default().fg(palette.warning)));
    }

    let status = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(palette.border)));
    f.render_widget(status, area);
}
