//! Copy and export adapters for a finished document
//!
//! Everything here works on the complete document, never on a revealed
//! prefix. Failures are returned to the caller and leave the session alone.

mod clipboard;
mod download;

pub use clipboard::{ClipboardSink, SystemClipboard};
pub use download::{DownloadSink, FileSink};

use crate::config::ExportConfig;
use crate::document::Document;
use crate::render::{escape_html, render};
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

/// MIME type office suites open as a word-processing document
pub const WORD_MIME: &str = "application/msword";

static MARKUP_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#*|_\-]").expect("static regex"));

static EXTRA_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// A file ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Strip markdown punctuation for pasting into plain-text fields
///
/// Removes every `#`, `*`, `|`, `_` and `-`, trims each line, and collapses
/// runs of blank lines down to one.
///
/// ```
/// use adscript::export::plain_text;
/// use adscript::Document;
///
/// let doc = Document::from("# Title\n**bold** text");
/// assert_eq!(plain_text(&doc), "Title\nbold text");
/// ```
pub fn plain_text(doc: &Document) -> String {
    let stripped = MARKUP_CHARS.replace_all(doc.as_str(), "");
    let trimmed = stripped
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    EXTRA_BLANK_LINES
        .replace_all(&trimmed, "\n\n")
        .into_owned()
}

/// Copy the document with markdown stripped
pub fn copy_plain(doc: &Document, sink: &mut dyn ClipboardSink) -> Result<()> {
    sink.set_text(&plain_text(doc))
        .context("Failed to copy plain text")?;
    tracing::info!(chars = doc.char_len(), "Copied script as plain text");
    Ok(())
}

/// Copy the raw markdown source
pub fn copy_markdown(doc: &Document, sink: &mut dyn ClipboardSink) -> Result<()> {
    sink.set_text(doc.as_str())
        .context("Failed to copy markdown")?;
    tracing::info!(chars = doc.char_len(), "Copied script as markdown");
    Ok(())
}

/// Font family as a CSS value: characters that could end the declaration,
/// the rule or the style element are dropped
fn css_font_family(family: &str) -> String {
    family
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
        .collect()
}

/// Wrap the rendered document in an HTML envelope word processors open
pub fn word_document(doc: &Document, options: &ExportConfig) -> Download {
    let html = format!(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
xmlns:w='urn:schemas-microsoft-com:office:word' \
xmlns='http://www.w3.org/TR/REC-html40'>\n\
<head><meta charset='utf-8'><title>{title}</title>\n\
<style>body{{font-family:{font};font-size:14px;line-height:1.6}}\
table{{border-collapse:collapse;width:100%}}\
td,th{{border:1px solid #ccc;padding:8px;text-align:left}}\
th{{background:#f4f4f4;font-weight:600}}\
h1{{font-size:20px}}h2{{font-size:16px}}</style></head>\n\
<body>{body}</body></html>",
        title = escape_html(&options.title),
        font = css_font_family(&options.font_family),
        body = render(doc.as_str()),
    );

    Download {
        file_name: format!("{}-script.doc", options.file_prefix),
        mime_type: WORD_MIME.to_string(),
        bytes: html.into_bytes(),
    }
}
