//! Display-string normalization.
//!
//! Exact and fuzzy matching both compare normalized strings, so the two
//! strategies always agree on what counts as a character match.

use nucleo_matcher::chars;
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A trimmed, lowercased, diacritic-folded string with no combining marks.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedString(String);

impl NormalizedString {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Contiguous substring containment
    #[must_use]
    pub fn contains(&self, needle: &NormalizedString) -> bool {
        self.0.contains(needle.as_str())
    }
}

impl AsRef<str> for NormalizedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw query or label.
///
/// Returns `None` for empty or all-whitespace input, which callers treat as
/// "no query".
#[must_use]
pub fn normalize(raw: &str) -> Option<NormalizedString> {
    let folded: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .map(chars::normalize)
        .collect();

    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(NormalizedString(trimmed.to_string()))
}
