//! The generated script text
//!
//! A `Document` is produced once by a generation source and never mutated.
//! It is cheap to clone (shared `Arc<str>`) so the reveal loop, the session
//! and the export adapters can all hold it at once.

use crate::util::{char_len, prefix_chars};
use std::fmt;
use std::sync::Arc;

/// Full generated script text in the markdown subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(Arc<str>);

impl Document {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, the unit the reveal loop advances by
    pub fn char_len(&self) -> usize {
        char_len(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading `chars` characters of the document
    pub fn prefix(&self, chars: usize) -> &str {
        prefix_chars(&self.0, chars)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Document {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_text() {
        let doc = Document::from("# Title");
        let other = doc.clone();
        assert_eq!(doc, other);
        assert!(std::ptr::eq(doc.as_str(), other.as_str()));
    }

    #[test]
    fn test_prefix_and_len() {
        let doc = Document::from("ab日本");
        assert_eq!(doc.char_len(), 4);
        assert_eq!(doc.prefix(3), "ab日");
        assert_eq!(doc.prefix(10), "ab日本");
    }
}
