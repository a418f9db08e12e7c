// Colors for the script viewer
//
// One fixed palette; the viewer has no theme switching.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub foreground: Color,
    pub heading: Color,
    /// Table headers and the focused block border
    pub highlight: Color,
    pub border: Color,
    pub title: Color,
    pub status_bar: Color,
    pub muted: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: Color::Reset,
            heading: Color::Cyan,
            highlight: Color::Yellow,
            border: Color::DarkGray,
            title: Color::Cyan,
            status_bar: Color::Gray,
            muted: Color::DarkGray,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}
