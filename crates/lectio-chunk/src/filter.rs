//! Noise and boilerplate filtering.
//!
//! A fixed blocklist of regex predicates, not a classifier; best-effort
//! by design. Patterns cover the junk that survives crude extraction from
//! scanned e-texts: running heads, page numbers, tables of contents,
//! license banners.

use std::sync::LazyLock;

use regex::Regex;

/// Candidate chunks shorter than this are discarded outright.
pub const NOISE_FLOOR: usize = 20;

/// A document whose only yield is shorter than this is dropped entirely;
/// anything above it is emitted as a best-effort sole chunk.
pub const SOLE_CHUNK_FLOOR: usize = 50;

static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^(table of )?contents$",
        r"(?i)^index$",
        r"(?i)^(chapter|book|part|canto|section)\s+[ivxlcdm\d]+\.?$",
        r"(?i)^page\s+\d+$",
        r"(?i)^[ivxlcdm\d]{1,6}$",
        r"(?i)project gutenberg",
        r"(?i)all rights reserved",
        r"(?i)^copyright\b",
        r"(?i)^printed (in|at|by)\b",
        r"(?i)^\*+\s*(start|end) of",
        r"(?i)^(footnotes?|endnotes?)[:.]?$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid boilerplate pattern"))
    .collect()
});

/// Fixed blocklist check against the trimmed text.
pub fn is_boilerplate(text: &str) -> bool {
    let trimmed = text.trim();
    BOILERPLATE.iter().any(|re| re.is_match(trimmed))
}

/// Too short or blocklisted — used by the cruder extraction stages, which
/// produce the junk segments this exists for.
pub fn is_noise(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() < NOISE_FLOOR || is_boilerplate(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_and_page_numbers_blocked() {
        assert!(is_boilerplate("Table of Contents"));
        assert!(is_boilerplate("CONTENTS"));
        assert!(is_boilerplate("Chapter XIV"));
        assert!(is_boilerplate("BOOK II."));
        assert!(is_boilerplate("Page 217"));
        assert!(is_boilerplate("217"));
        assert!(is_boilerplate("xiv"));
    }

    #[test]
    fn license_banners_blocked() {
        assert!(is_boilerplate(
            "*** START OF THE PROJECT GUTENBERG EBOOK MEDITATIONS ***"
        ));
        assert!(is_boilerplate("This text courtesy of Project Gutenberg."));
        assert!(is_boilerplate("Copyright 1913 by the publishers"));
    }

    #[test]
    fn real_text_passes() {
        assert!(!is_boilerplate("In the beginning God created the heaven and the earth."));
        assert!(!is_boilerplate("The unexamined life is not worth living."));
        // mentions a chapter without being a bare heading
        assert!(!is_boilerplate("Chapter two of the work discusses virtue at length."));
    }

    #[test]
    fn noise_floor_applies() {
        assert!(is_noise("short"));
        assert!(is_noise("   "));
        assert!(!is_noise("long enough to be a real piece of text"));
    }
}
