// Pipe-table detection
//
// Rows are classified one line at a time. The parse state lives only for
// the duration of a single render call, so a table that is still streaming
// in simply renders with fewer rows on this tick.

use super::inline::format_inline;
use regex::Regex;
use std::sync::LazyLock;

/// A row made only of pipes, dashes, colons and whitespace
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[\s\-:|]+\|$").expect("separator pattern compiles"));

/// How a single line takes part in table parsing
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Row<'a> {
    /// `|---|:--|`: marks the end of the header, emits nothing
    Separator,
    /// Pipe-bounded but carrying no cells (e.g. a lone `|` mid-stream)
    Empty,
    /// Trimmed cell contents, still raw markdown
    Cells(Vec<&'a str>),
    /// Anything that is not pipe-bounded
    Text,
}

pub(crate) fn classify(line: &str) -> Row<'_> {
    let trimmed = line.trim();
    if !(trimmed.starts_with('|') && trimmed.ends_with('|')) {
        return Row::Text;
    }
    if SEPARATOR.is_match(trimmed) {
        return Row::Separator;
    }

    // Bounded by pipes, so the first and last fragments are always empty
    let fragments: Vec<&str> = trimmed.split('|').collect();
    let inner = &fragments[1..fragments.len() - 1];
    if inner.is_empty() {
        return Row::Empty;
    }

    Row::Cells(inner.iter().map(|cell| cell.trim()).collect())
}

/// Per-render table state: `{ in_table, is_header_row }`
#[derive(Debug, Default)]
pub(crate) struct TableParseState {
    in_table: bool,
    is_header_row: bool,
}

impl TableParseState {
    /// Emit a row, opening the table first if needed.
    ///
    /// The first row of a table is its header; every later row goes to the body.
    pub(crate) fn push_row(&mut self, cells: &[&str], out: &mut String) {
        if !self.in_table {
            out.push_str(r#"<table class="script-table">"#);
            self.in_table = true;
            self.is_header_row = true;
        }

        if self.is_header_row {
            out.push_str("<thead><tr>");
            push_cells(out, cells, "th");
            out.push_str("</tr></thead><tbody>");
            self.is_header_row = false;
        } else {
            out.push_str("<tr>");
            push_cells(out, cells, "td");
            out.push_str("</tr>");
        }
    }

    /// Terminate the body of an open table; no-op otherwise
    pub(crate) fn close(&mut self, out: &mut String) {
        if self.in_table {
            out.push_str("</tbody></table>");
            self.in_table = false;
        }
    }
}

fn push_cells(out: &mut String, cells: &[&str], tag: &str) {
    for cell in cells {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        out.push_str(&format_inline(cell));
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}
