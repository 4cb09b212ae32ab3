//! Sentence and word splitting for oversized sections

use std::sync::LazyLock;

use regex::Regex;

/// A sentence ends at `.`, `!` or `?` followed by whitespace.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex"));

/// Split text into sentences, keeping terminators and dropping the
/// whitespace between them. Naive on abbreviations; boundary fidelity
/// matters less here than deterministic, bounded pieces.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        // keep the terminator (always one ASCII byte), drop the whitespace
        let end = m.start() + 1;
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Hard-split text with no usable sentence boundaries, preferring the last
/// whitespace before `max` and snapping cuts to char boundaries.
pub fn hard_split(text: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text.trim();
    while rest.len() > max {
        let mut cut = max;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let cut = match rest[..cut].rfind(char::is_whitespace) {
            Some(pos) if pos > 0 => pos,
            _ => cut,
        };
        // a leading char wider than max would otherwise never shrink rest
        let cut = if cut == 0 {
            rest.char_indices().nth(1).map(|(i, _)| i).unwrap_or(rest.len())
        } else {
            cut
        };
        pieces.push(rest[..cut].trim_end().to_string());
        rest = rest[cut..].trim_start();
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

/// Last `n` whitespace-separated words, for the overlap bridge.
pub fn trailing_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(n);
    words[start..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators() {
        let sentences = split_sentences("First one. Second one! Third one? Tail without end");
        assert_eq!(
            sentences,
            vec![
                "First one.",
                "Second one!",
                "Third one?",
                "Tail without end"
            ]
        );
    }

    #[test]
    fn single_sentence_unsplit() {
        assert_eq!(split_sentences("Just one sentence."), vec!["Just one sentence."]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn terminator_without_space_does_not_split() {
        // decimal point inside a number stays put
        let sentences = split_sentences("Verse 3.16 is famous. Indeed.");
        assert_eq!(sentences, vec!["Verse 3.16 is famous.", "Indeed."]);
    }

    #[test]
    fn hard_split_prefers_word_boundary() {
        let pieces = hard_split("alpha beta gamma delta", 11);
        assert!(pieces.iter().all(|p| p.len() <= 11));
        assert_eq!(pieces.join(" "), "alpha beta gamma delta");
    }

    #[test]
    fn hard_split_handles_unbroken_runs() {
        let pieces = hard_split(&"x".repeat(25), 10);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].len(), 10);
        assert_eq!(pieces[2].len(), 5);
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let text = "αβγδε ζηθικ λμνξο";
        for piece in hard_split(text, 7) {
            // must not panic and must be valid slices
            assert!(!piece.is_empty());
        }
    }

    #[test]
    fn trailing_words_takes_suffix() {
        assert_eq!(trailing_words("one two three four", 2), "three four");
        assert_eq!(trailing_words("one", 5), "one");
        assert_eq!(trailing_words("", 3), "");
    }
}
