// Markdown-subset renderer
//
// Converts the script dialect (headings, bold/italic, `---`, pipe tables,
// blank-line breaks) into a markup fragment. The renderer is a pure
// function of its input: the reveal loop calls it with every growing prefix
// of a document and each call starts from scratch, so a half-arrived table
// or an unclosed `**` degrades to fewer rows or literal text, never to
// unbalanced tags.
//
// Supported:
//   `# `, `## `, `### `   line-anchored headings
//   `**x**`, `*x*`        strong / emphasis (single line)
//   `---`                 thematic break
//   `| a | b |`           table rows, `|---|` separators
//   blank line            <br/>

mod inline;
mod table;

pub(crate) use inline::escape_html;
use table::{Row, TableParseState};

/// Render markdown-subset text to a markup fragment.
///
/// Total: never panics and always returns properly nested markup, whatever
/// the input. Lines outside tables are emitted verbatim (after inline
/// rules) followed by a newline; there is no paragraph wrapping.
pub fn render(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    let mut table = TableParseState::default();

    for line in text.split('\n') {
        // CRLF input: the \r belongs to the line ending
        let line = line.strip_suffix('\r').unwrap_or(line);
        match table::classify(line) {
            Row::Separator | Row::Empty => {}
            Row::Cells(cells) => table.push_row(&cells, &mut out),
            Row::Text => {
                table.close(&mut out);
                if line.trim().is_empty() {
                    out.push_str("<br/>");
                } else {
                    out.push_str(&inline::format_line(line));
                    out.push('\n');
                }
            }
        }
    }

    table.close(&mut out);
    out
}
