//! Author-name normalization

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical identity key for an author name: lowercase, NFD-decomposed,
/// diacritics and all non-alphanumerics stripped.
///
/// Two records with equal keys are treated as the same real-world entity.
/// This is a heuristic — distinct authors whose names normalize identically
/// will merge — and the policy is part of the corpus contract: changing it
/// changes corpus content, so keep it as-is.
pub fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
