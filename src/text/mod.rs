//! Text processing for TTS: normalization, sentence splitting, chunk packing.

pub mod chunker;
pub mod splitter;

pub use chunker::{OversizePolicy, pack_chunks};
pub use splitter::Sentences;

/// Collapse every whitespace run into a single space and trim the ends.
///
/// Pure and infallible; the result is empty iff the input holds no
/// non-whitespace characters.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        let text = "Hello   world\n\nnext\tline";
        assert_eq!(normalize(text), "Hello world next line");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize("  padded  "), "padded");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t  "), "");
    }

    #[test]
    fn test_normalize_preserves_punctuation() {
        assert_eq!(normalize("One. Two!  Three?"), "One. Two! Three?");
    }
}
