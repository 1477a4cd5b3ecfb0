//! Word-budget chunking of extracted document text.
//!
//! Splitting is deliberately word-based: the text is broken on whitespace runs and
//! grouped into fixed-size windows, with no attempt to honor sentence or paragraph
//! boundaries. Downstream consumers rely on this exact split, so it must not be
//! replaced with semantic chunking.

use super::types::Segment;

/// Split `text` into segments of at most `max_words` whitespace-delimited words.
///
/// Word order is preserved and segment indices are assigned in split order starting
/// at 0 with no gaps; only the final segment may hold fewer than `max_words` words.
/// Empty or whitespace-only input yields no segments. A `max_words` of zero is
/// treated as 1. Pure and deterministic: no I/O, no failure mode.
pub(crate) fn chunk_text(text: &str, max_words: usize) -> Vec<Segment> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words)
        .enumerate()
        .map(|(index, window)| Segment {
            index,
            content: window.join(" "),
        })
        .collect()
}
