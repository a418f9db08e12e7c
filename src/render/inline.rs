// Line-level and inline rules
//
// Everything here works on a single line. Text is escaped first so the only
// tags in the result are the ones emitted below, which is what lets the
// italic pass check tag balance with a plain scan.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// `**…**`, non-greedy, first match wins. `.` never crosses a newline.
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern compiles"));

/// Header markers, most specific first so `### ` is never read as `# `
const HEADINGS: [(&str, &str); 3] = [("### ", "h3"), ("## ", "h2"), ("# ", "h1")];

const STRONG_OPEN: &str = "<strong>";
const STRONG_CLOSE: &str = "</strong>";

/// Transform one non-table line: thematic break, heading, or inline text.
pub(crate) fn format_line(line: &str) -> String {
    if line == "---" {
        return "<hr/>".to_string();
    }

    for (marker, tag) in HEADINGS {
        if let Some(rest) = line.strip_prefix(marker) {
            if !rest.is_empty() {
                return format!("<{tag}>{}</{tag}>", format_inline(rest));
            }
        }
    }

    format_inline(line)
}

/// Escape, then bold, then italic.
pub(crate) fn format_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let bold = BOLD.replace_all(&escaped, "<strong>${1}</strong>");
    apply_italic(&bold)
}

/// Escape the characters that could open or break a tag
pub(crate) fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Single-asterisk emphasis over text that already carries bold markup.
///
/// Mirrors a non-greedy `\*(.+?)\*` scan: an opening `*` pairs with the first
/// `*` at least one character later. A pair whose content would cut a
/// `<strong>` span in half is left as literal text.
fn apply_italic(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 16);
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'*' {
            let close = bytes
                .get(i + 2..)
                .and_then(|rest| rest.iter().position(|&b| b == b'*'))
                .map(|offset| i + 2 + offset);

            if let Some(close) = close {
                let inner = &text[i + 1..close];
                if strong_balanced(inner) {
                    out.push_str(&text[copied..i]);
                    out.push_str("<em>");
                    out.push_str(inner);
                    out.push_str("</em>");
                    i = close + 1;
                    copied = i;
                    continue;
                }
            }
        }
        i += 1;
    }

    out.push_str(&text[copied..]);
    out
}

fn strong_balanced(fragment: &str) -> bool {
    let mut depth = 0usize;
    let mut rest = fragment;

    while let Some(pos) = rest.find('<') {
        rest = &rest[pos..];
        if let Some(after) = rest.strip_prefix(STRONG_OPEN) {
            depth += 1;
            rest = after;
        } else if let Some(after) = rest.strip_prefix(STRONG_CLOSE) {
            if depth == 0 {
                return false;
            }
            depth -= 1;
            rest = after;
        } else {
            rest = &rest[1..];
        }
    }

    depth == 0
}
