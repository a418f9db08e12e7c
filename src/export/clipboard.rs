//! Clipboard sinks
//!
//! `SystemClipboard` uses the `arboard` crate for cross-platform support
//! (Windows, macOS, Linux). The clipboard is created fresh each time to
//! avoid holding resources.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Somewhere copied text can go
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard
///
/// Common failure cases: no display server (headless Linux), permission denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to set clipboard text")?;
        Ok(())
    }
}
