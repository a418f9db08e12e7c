//! Shared utility functions

/// Take the first `max_chars` characters of a string without splitting a
/// UTF-8 sequence.
///
/// If the string has fewer characters, returns it unchanged.
///
/// # Examples
///
/// ```
/// use adscript::util::prefix_chars;
///
/// // ASCII: straightforward truncation
/// assert_eq!(prefix_chars("hello world", 5), "hello");
///
/// // Multi-byte characters count once each
/// assert_eq!(prefix_chars("日本語", 2), "日本");
/// ```
pub fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Number of characters (Unicode scalar values) in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_shorter_than_max() {
        assert_eq!(prefix_chars("hello", 10), "hello");
    }

    #[test]
    fn test_prefix_at_ascii_boundary() {
        assert_eq!(prefix_chars("hello world", 5), "hello");
    }

    #[test]
    fn test_prefix_counts_chars_not_bytes() {
        // Each character is 3 bytes
        let s = "কনসেপ্ট";
        assert_eq!(prefix_chars(s, 1), "ক");
        assert_eq!(prefix_chars(s, 2), "কন");
    }

    #[test]
    fn test_prefix_empty_string() {
        assert_eq!(prefix_chars("", 5), "");
    }

    #[test]
    fn test_prefix_to_zero() {
        assert_eq!(prefix_chars("hello", 0), "");
    }

    #[test]
    fn test_char_len() {
        assert_eq!(char_len("abc"), 3);
        assert_eq!(char_len("日本語"), 3);
        assert_eq!(char_len(""), 0);
    }
}
