//! Greedy packing of sentences into bounded-size chunks.

use clap::ValueEnum;

/// What to do with a single sentence longer than the chunk bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OversizePolicy {
    /// Emit the sentence as its own chunk, exceeding the bound.
    Overflow,
    /// Slice the sentence into consecutive pieces of at most the bound.
    HardSplit,
}

impl OversizePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            OversizePolicy::Overflow => "overflow",
            OversizePolicy::HardSplit => "hard-split",
        }
    }
}

/// Pack sentences into chunks of at most `max_chars` characters.
///
/// Sentences are joined by single spaces in a running buffer; the buffer is
/// flushed when the next sentence would push it past the bound. Under
/// [`OversizePolicy::HardSplit`] a sentence longer than the bound is sliced
/// into fixed-size pieces; under [`OversizePolicy::Overflow`] it becomes a
/// single over-length chunk.
///
/// No chunk is ever empty and the result is empty iff `sentences` is.
pub fn pack_chunks<'a, I>(sentences: I, max_chars: usize, policy: OversizePolicy) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    assert!(max_chars > 0, "chunk bound must be positive");

    let mut chunks = Vec::new();
    let mut buf = String::new();
    // Accumulated character count: each sentence contributes its length
    // plus one separator.
    let mut buf_chars = 0usize;

    for sentence in sentences {
        let sentence_chars = sentence.chars().count();

        if policy == OversizePolicy::HardSplit && sentence_chars > max_chars {
            if !buf.is_empty() {
                chunks.push(std::mem::take(&mut buf));
                buf_chars = 0;
            }
            chunks.extend(hard_split(sentence, max_chars));
            continue;
        }

        if !buf.is_empty() && buf_chars + sentence_chars + 1 > max_chars {
            chunks.push(std::mem::take(&mut buf));
            buf_chars = 0;
        }
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(sentence);
        buf_chars += sentence_chars + 1;
    }

    if !buf.is_empty() {
        chunks.push(buf);
    }

    chunks
}

/// Slice text into consecutive pieces of at most `max_chars` characters;
/// every piece except possibly the last has exactly `max_chars`.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::with_capacity(chars.len().div_ceil(max_chars));
    let mut start = 0;
    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        start = end;
    }
    pieces
}
