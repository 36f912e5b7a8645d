//! Sentence-aware text chunking for transcripts that exceed a single
//! generation call.
//!
//! Text is cut into sentences after terminal punctuation (both the ASCII
//! forms and their full-width CJK counterparts), then sentences are packed
//! greedily into segments of at most `max_chunk_size` characters. A sentence
//! that is longer than the limit on its own is emitted as a single oversized
//! segment; it is never cut mid-sentence.

use serde::Serialize;

/// Characters that end a sentence.
const SENTENCE_TERMINALS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Ordered segments of a text. Concatenating them in order yields the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkedText {
    segments: Vec<String>,
}

impl ChunkedText {
    /// Segments in input order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.segments.iter()
    }

    /// Rebuild the original text.
    pub fn concat(&self) -> String {
        self.segments.concat()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.segments
    }
}

impl<'a> IntoIterator for &'a ChunkedText {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Character count, which is what `max_chunk_size` is measured in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into sentences.
///
/// A run of terminal punctuation stays with the sentence it ends, and any
/// whitespace after it is attached to that sentence too, so the pieces
/// concatenate back to `text` exactly.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !SENTENCE_TERMINALS.contains(&c) {
            continue;
        }

        while let Some(&(_, next)) = chars.peek() {
            if SENTENCE_TERMINALS.contains(&next) {
                chars.next();
            } else {
                break;
            }
        }
        while let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }

        let end = chars.peek().map(|&(i, _)| i).unwrap_or(text.len());
        sentences.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

/// Pack sentences of `text` into segments of at most `max_chunk_size` characters.
///
/// Pure and total: the same input always produces the same boundaries, and
/// empty input produces no segments.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> ChunkedText {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = char_len(sentence);

        if current_len + sentence_len <= max_chunk_size {
            current.push_str(sentence);
            current_len += sentence_len;
        } else {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current.push_str(sentence);
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    ChunkedText { segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_mixed_punctuation() {
        let text = "你好。今天天气很好！Really? Yes... done";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec!["你好。", "今天天气很好！", "Really? ", "Yes... ", "done"]
        );
        assert_eq!(sentences.concat(), text);
    }

    #[test]
    fn test_empty_input_yields_no_segments() {
        assert!(chunk_text("", 100).is_empty());
    }

    #[test]
    fn test_short_text_is_one_segment() {
        let chunks = chunk_text("One. Two. Three.", 100);
        assert_eq!(chunks.segments(), ["One. Two. Three."]);
    }

    #[test]
    fn test_long_text_splits_at_sentence_boundaries() {
        let text = "Alpha beta. Gamma delta! Epsilon zeta? Eta theta. Iota kappa.";
        let max = 26;
        let chunks = chunk_text(text, max);

        assert!(chunks.len() >= 2);
        assert_eq!(chunks.concat(), text);

        let sentences = split_sentences(text);
        for segment in &chunks {
            assert!(char_len(segment) <= max, "segment too long: {segment:?}");
            // Every segment is a whole run of sentences.
            assert!(sentences.iter().any(|s| segment.starts_with(s)));
            assert!(SENTENCE_TERMINALS
                .iter()
                .any(|t| segment.trim_end().ends_with(*t)));
        }
    }

    #[test]
    fn test_greedy_packing() {
        let chunks = chunk_text("aaaa. bbbb. cccc.", 12);
        assert_eq!(chunks.segments(), ["aaaa. bbbb. ", "cccc."]);
    }

    #[test]
    fn test_oversized_sentence_is_kept_whole() {
        let long = "This single sentence is far longer than the limit allows.";
        let text = format!("Short. {long} Tail.");
        let chunks = chunk_text(&text, 10);

        let middle = format!("{long} ");
        assert_eq!(chunks.segments(), ["Short. ", middle.as_str(), "Tail."]);
        let oversized: Vec<_> = chunks.iter().filter(|s| char_len(s) > 10).collect();
        assert_eq!(oversized.len(), 1);
        assert_eq!(split_sentences(oversized[0]).len(), 1);
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // Each sentence is 4 characters but 12 bytes.
        let chunks = chunk_text("一二三。四五六。七八九。", 8);
        assert_eq!(chunks.segments(), ["一二三。四五六。", "七八九。"]);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let text = "第一句。第二句！Third sentence? Fourth.".repeat(20);
        assert_eq!(chunk_text(&text, 50), chunk_text(&text, 50));
    }
}
