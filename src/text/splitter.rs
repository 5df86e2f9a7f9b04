//! Sentence boundary iteration over normalized text.

use regex::Regex;
use std::sync::OnceLock;

static BOUNDARY: OnceLock<Regex> = OnceLock::new();

/// A boundary is `.`, `!` or `?` followed by whitespace; the split happens
/// after the punctuation mark.
fn boundary() -> &'static Regex {
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern"))
}

/// Lazy iterator over the sentences of a normalized text.
///
/// Yields non-empty sentence slices in document order; an empty input
/// yields nothing. Once exhausted the iterator stays exhausted, it never
/// re-reads the input.
pub struct Sentences<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Sentences<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        match boundary().find(rest) {
            Some(m) => {
                // The match starts at the punctuation mark, which belongs
                // to the sentence; the trailing whitespace is consumed.
                self.pos += m.end();
                Some(&rest[..=m.start()])
            }
            None => {
                self.pos = self.text.len();
                Some(rest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<&str> {
        Sentences::new(text).collect()
    }

    #[test]
    fn test_split_basic() {
        assert_eq!(
            collect("Hello world. This is a test!"),
            vec!["Hello world.", "This is a test!"]
        );
    }

    #[test]
    fn test_split_all_terminators() {
        assert_eq!(
            collect("One. Two! Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
    }

    #[test]
    fn test_no_trailing_whitespace_keeps_tail() {
        // "a.b" has no whitespace after the period, so it is one sentence.
        assert_eq!(collect("a.b"), vec!["a.b"]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn test_exhausted_iterator_stays_exhausted() {
        let mut sentences = Sentences::new("One. Two.");
        assert_eq!(sentences.next(), Some("One."));
        assert_eq!(sentences.next(), Some("Two."));
        assert_eq!(sentences.next(), None);
        assert_eq!(sentences.next(), None);
    }

    #[test]
    fn test_is_lazy() {
        // Only the first boundary is scanned to produce the first item.
        let mut sentences = Sentences::new("First. Second. Third.");
        assert_eq!(sentences.next(), Some("First."));
        assert_eq!(sentences.pos, 7);
    }
}
