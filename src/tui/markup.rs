// Markup display for the script panel
//
// Turns the renderer's output into styled ratatui lines. The input is
// always markup the renderer produced (escaped text, a fixed tag set,
// properly nested), so this only needs to recognise those tags:
//
//   <h1> <h2> <h3>          heading lines
//   <strong> <em>           bold / italic spans
//   <hr/> <br/>             rule / blank line
//   <table>..<tr><th|td>    table, columns padded to the widest cell
//
// Unknown tags are ignored rather than shown.

use super::palette::Palette;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Width of the line drawn for `<hr/>`
const RULE_WIDTH: usize = 40;

/// Column separator for table rows
const CELL_SEPARATOR: &str = " │ ";

/// A piece of markup with its meaning
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Newline,
    Open(&'a str),
    Close(&'a str),
    /// Self-closing tag: `<hr/>`, `<br/>`
    Void(&'a str),
}

/// Split markup into text runs, newlines and tags
fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = markup;

    while !rest.is_empty() {
        if let Some(tag_body) = rest.strip_prefix('<') {
            let Some(end) = tag_body.find('>') else {
                // Unterminated tag: treat the remainder as text
                tokens.push(Token::Text(rest));
                break;
            };
            let tag = &tag_body[..end];
            rest = &tag_body[end + 1..];

            if let Some(name) = tag.strip_prefix('/') {
                tokens.push(Token::Close(name));
            } else if let Some(name) = tag.strip_suffix('/') {
                tokens.push(Token::Void(name.trim()));
            } else {
                // Drop attributes: <table class="...">
                let name = tag.split_whitespace().next().unwrap_or("");
                tokens.push(Token::Open(name));
            }
        } else if let Some(after) = rest.strip_prefix('\n') {
            tokens.push(Token::Newline);
            rest = after;
        } else {
            let end = rest.find(['<', '\n']).unwrap_or(rest.len());
            tokens.push(Token::Text(&rest[..end]));
            rest = &rest[end..];
        }
    }

    tokens
}

/// Undo the renderer's escaping
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// One table cell: spans plus display width
#[derive(Default)]
struct Cell {
    spans: Vec<Span<'static>>,
    width: usize,
    header: bool,
}

/// Table being collected until `</table>`
#[derive(Default)]
struct TableBuffer {
    rows: Vec<Vec<Cell>>,
}

impl TableBuffer {
    /// Emit the rows with every column padded to its widest cell
    fn flush(self, lines: &mut Vec<Line<'static>>, palette: &Palette) {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width);
            }
        }

        for (r, row) in self.rows.into_iter().enumerate() {
            let is_header = row.iter().any(|c| c.header);
            let mut spans = Vec::new();
            for (i, cell) in row.into_iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(CELL_SEPARATOR, Style::default().fg(palette.border)));
                }
                let pad = widths[i].saturating_sub(cell.width);
                spans.extend(cell.spans);
                if pad > 0 {
                    spans.push(Span::raw(" ".repeat(pad)));
                }
            }
            lines.push(Line::from(spans));

            // Underline the header row
            if r == 0 && is_header {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                lines.push(Line::from(Span::styled(
                    rule,
                    Style::default().fg(palette.border),
                )));
            }
        }
    }
}

/// Convert renderer markup into styled lines
pub fn to_lines(markup: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut heading: Option<u8> = None;

    let mut table: Option<TableBuffer> = None;
    let mut cell: Option<Cell> = None;

    let style_for = |bold: usize, italic: usize, heading: Option<u8>| {
        let mut style = Style::default().fg(palette.foreground);
        if let Some(level) = heading {
            style = style.fg(palette.heading).add_modifier(Modifier::BOLD);
            if level == 1 {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
        }
        if bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    };

    for token in tokenize(markup) {
        match token {
            Token::Text(text) => {
                let text = unescape(text);
                let mut style = style_for(bold, italic, heading);
                match cell.as_mut() {
                    Some(cell) => {
                        if cell.header {
                            style = style.fg(palette.highlight).add_modifier(Modifier::BOLD);
                        }
                        cell.width += text.width();
                        cell.spans.push(Span::styled(text, style));
                    }
                    None => current.push(Span::styled(text, style)),
                }
            }
            Token::Newline | Token::Void("br") => {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            Token::Void("hr") => {
                current.push(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(palette.border),
                ));
            }
            Token::Open("strong") => bold += 1,
            Token::Close("strong") => bold = bold.saturating_sub(1),
            Token::Open("em") => italic += 1,
            Token::Close("em") => italic = italic.saturating_sub(1),
            Token::Open("h1") => heading = Some(1),
            Token::Open("h2") => heading = Some(2),
            Token::Open("h3") => heading = Some(3),
            Token::Close("h1" | "h2" | "h3") => heading = None,
            Token::Open("table") => {
                // Tables always start on their own line
                if !current.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current)));
                }
                table = Some(TableBuffer::default());
            }
            Token::Close("table") => {
                if let Some(buffer) = table.take() {
                    buffer.flush(&mut lines, palette);
                }
            }
            Token::Open("tr") => {
                if let Some(buffer) = table.as_mut() {
                    buffer.rows.push(Vec::new());
                }
            }
            Token::Open(name @ ("th" | "td")) => {
                cell = Some(Cell {
                    header: name == "th",
                    ..Default::default()
                });
            }
            Token::Close("th" | "td") => {
                if let (Some(done), Some(buffer)) = (cell.take(), table.as_mut()) {
                    if let Some(row) = buffer.rows.last_mut() {
                        row.push(done);
                    }
                }
            }
            // thead, tbody, /tr and anything unexpected carry no display
            _ => {}
        }
    }

    // Input is normally closed, but don't lose a trailing table or line
    if let Some(buffer) = table.take() {
        buffer.flush(&mut lines, palette);
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use adscript::render;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn plain_lines(markdown: &str) -> Vec<String> {
        to_lines(&render(markdown), &Palette::default())
            .iter()
            .map(text_of)
            .collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("<h1>A &amp; B</h1>\n<br/>"),
            vec![
                Token::Open("h1"),
                Token::Text("A &amp; B"),
                Token::Close("h1"),
                Token::Newline,
                Token::Void("br"),
            ]
        );
        assert_eq!(
            tokenize("<table class=\"script-table\">"),
            vec![Token::Open("table")]
        );
    }

    #[test]
    fn test_heading_and_blank_line() {
        assert_eq!(plain_lines("# Title\n\nbody"), vec!["Title", "", "body"]);
    }

    #[test]
    fn test_heading_is_bold() {
        let lines = to_lines(&render("## Hook"), &Palette::default());
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_strong_and_em_styles() {
        let lines = to_lines(&render("a **b** *c*"), &Palette::default());
        let spans = &lines[0].spans;
        let b = spans.iter().find(|s| s.content == "b").unwrap();
        let c = spans.iter().find(|s| s.content == "c").unwrap();
        assert!(b.style.add_modifier.contains(Modifier::BOLD));
        assert!(c.style.add_modifier.contains(Modifier::ITALIC));
        assert!(!c.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_entities_are_unescaped() {
        assert_eq!(plain_lines("R&D <team>"), vec!["R&D <team>"]);
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let lines = plain_lines("| Scene | Visual |\n|---|---|\n| 1 | Sunrise over Dhaka |\nafter");
        assert_eq!(lines[0], "Scene │ Visual            ");
        assert_eq!(lines[1], "──────┼───────────────────");
        assert_eq!(lines[2], "1     │ Sunrise over Dhaka");
        assert_eq!(lines[3], "after");
    }

    #[test]
    fn test_wide_characters_pad_by_display_width() {
        let lines = plain_lines("| নাম | x |\n| ab | y |");
        // Bengali vowel signs make char count and display width disagree
        let first = UnicodeWidthStr::width(lines[0].split(" │ ").next().unwrap());
        let second = UnicodeWidthStr::width(lines[2].split(" │ ").next().unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rule() {
        assert_eq!(plain_lines("---"), vec!["─".repeat(RULE_WIDTH)]);
    }

    #[test]
    fn test_every_prefix_of_sample_converts() {
        let sample = adscript::generation::SAMPLE_SCRIPT;
        let mut end = 0;
        for (i, _) in sample.char_indices().skip(1) {
            end = i;
            let _ = to_lines(&render(&sample[..end]), &Palette::default());
        }
        assert!(end > 0);
    }
}
