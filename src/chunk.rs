//! Recursive overlapping text chunker.
//!
//! Splits text on a separator cascade (paragraphs, then lines, then words,
//! then single characters) and merges the pieces back into chunks of at most
//! `chunk_size` characters, where adjacent chunks share roughly `overlap`
//! characters of trailing context. Deterministic for identical inputs.

use crate::error::{DexError, Result};

const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(DexError::Configuration(
            "chunk_size must be > 0".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(DexError::Configuration(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }
    if text.trim().is_empty() {
        return Err(DexError::EmptyInput("input text".to_string()));
    }

    let splits = leaf_splits(text, chunk_size, &SEPARATORS);
    Ok(merge_splits(&splits, chunk_size, overlap))
}

/// Break `text` into pieces no longer than `chunk_size` characters, splitting
/// on the coarsest separator that works before falling back to finer ones.
fn leaf_splits(text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    match separators.split_first() {
        Some((sep, rest)) => {
            let mut out = Vec::new();
            for piece in text.split(sep) {
                if piece.is_empty() {
                    continue;
                }
                if piece.chars().count() <= chunk_size {
                    out.push(piece.to_string());
                } else {
                    out.extend(leaf_splits(piece, chunk_size, rest));
                }
            }
            out
        }
        // No separators left: hard-split at character boundaries.
        None => {
            let chars: Vec<char> = text.chars().collect();
            chars
                .chunks(chunk_size)
                .map(|window| window.iter().collect())
                .collect()
        }
    }
}

/// Greedily pack splits into chunks, carrying a tail window of about
/// `overlap` characters forward into the next chunk.
fn merge_splits(splits: &[String], chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: Vec<String> = Vec::new();

    for split in splits {
        let split_len = split.chars().count();
        if joined_len(&window) + joined_sep(&window) + split_len > chunk_size
            && !window.is_empty()
        {
            chunks.push(window.join(" "));
            // Shrink the window down to the overlap budget, and further if
            // the incoming split would not fit beside it.
            while !window.is_empty()
                && (joined_len(&window) > overlap
                    || joined_len(&window) + joined_sep(&window) + split_len > chunk_size)
            {
                window.remove(0);
            }
        }
        window.push(split.clone());
    }

    if !window.is_empty() {
        chunks.push(window.join(" "));
    }
    chunks
}

fn joined_len(window: &[String]) -> usize {
    window.iter().map(|s| s.chars().count()).sum::<usize>()
        + window.len().saturating_sub(1)
}

/// Extra separator cost of appending one more split to `window`.
fn joined_sep(window: &[String]) -> usize {
    if window.is_empty() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk("hello world", 100, 10).unwrap();
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn zero_chunk_size_is_a_configuration_error() {
        assert!(matches!(
            chunk("hello", 0, 0),
            Err(DexError::Configuration(_))
        ));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        assert!(matches!(
            chunk("hello", 10, 10),
            Err(DexError::Configuration(_))
        ));
    }

    #[test]
    fn whitespace_only_text_is_empty_input() {
        assert!(matches!(chunk("  \n\t ", 10, 2), Err(DexError::EmptyInput(_))));
    }

    #[test]
    fn chunks_respect_the_size_limit() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunk(text, 20, 5).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 20, "chunk too long: {:?}", c);
        }
    }

    #[test]
    fn paragraph_boundaries_are_preferred() {
        let text = "first paragraph here\n\nsecond paragraph here";
        let chunks = chunk(text, 25, 5).unwrap();
        assert_eq!(chunks[0], "first paragraph here");
        assert!(chunks.last().unwrap().contains("second paragraph"));
    }

    #[test]
    fn adjacent_chunks_share_overlap_context() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk(text, 20, 10).unwrap();
        assert!(chunks.len() > 1);

        // Every chunk after the first starts with words from its predecessor.
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].contains(first_word),
                "no shared context between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn oversized_single_word_is_hard_split() {
        let text = "x".repeat(50);
        let chunks = chunk(&text, 20, 5).unwrap();
        assert!(chunks.len() >= 3);
        for c in &chunks {
            assert!(c.chars().count() <= 20);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "some repeated content\nspread across lines\n\nand paragraphs of text";
        let a = chunk(text, 30, 8).unwrap();
        let b = chunk(text, 30, 8).unwrap();
        assert_eq!(a, b);
    }
}
