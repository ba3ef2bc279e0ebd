use crate::text::NormalizedString;

/// Compiled fuzzy query.
///
/// Matches when the query's characters occur in the candidate in order,
/// with any number of characters between them. Both sides are compared
/// code point by code point, so every character of a normalized string
/// takes part and the test never scores.
#[derive(Debug, Clone)]
pub struct FuzzyPattern {
    chars: Box<[char]>,
    source: NormalizedString,
}

impl FuzzyPattern {
    #[must_use]
    pub fn compile(query: &NormalizedString) -> Self {
        Self {
            chars: query.as_str().chars().collect(),
            source: query.clone(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &NormalizedString {
        &self.source
    }

    /// Greedy subsequence walk. Linear in the candidate length.
    #[must_use]
    pub fn matches(&self, candidate: &NormalizedString) -> bool {
        let mut needle = self.chars.iter().peekable();
        for c in candidate.as_str().chars() {
            match needle.peek() {
                Some(&&want) if want == c => {
                    needle.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        needle.peek().is_none()
    }
}

/// Match predicate for one filter pass: contiguous substring, or (when
/// enabled) the fuzzy subsequence test.
pub struct QueryMatcher {
    query: NormalizedString,
    fuzzy: Option<FuzzyPattern>,
}

impl QueryMatcher {
    #[must_use]
    pub fn new(query: NormalizedString, fuzzy: bool) -> Self {
        let fuzzy = fuzzy.then(|| FuzzyPattern::compile(&query));
        Self { query, fuzzy }
    }

    #[must_use]
    pub fn query(&self) -> &NormalizedString {
        &self.query
    }

    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy.is_some()
    }

    #[must_use]
    pub fn is_match(&self, candidate: &NormalizedString) -> bool {
        candidate.contains(&self.query)
            || self
                .fuzzy
                .as_ref()
                .is_some_and(|pattern| pattern.matches(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    fn n(s: &str) -> NormalizedString {
        normalize(s).unwrap()
    }

    #[test]
    fn test_subsequence_in_order_matches() {
        let pattern = FuzzyPattern::compile(&n("stng"));
        assert!(pattern.matches(&n("Settings")));
    }

    #[test]
    fn test_out_of_order_does_not_match() {
        let pattern = FuzzyPattern::compile(&n("gnts"));
        assert!(!pattern.matches(&n("Settings")));
    }

    #[test]
    fn test_pattern_matches_own_source() {
        for s in ["calculator", "a", "google maps", "cafe"] {
            let source = n(s);
            assert!(FuzzyPattern::compile(&source).matches(&source), "{s}");
        }
    }

    #[test]
    fn test_query_longer_than_candidate_fails() {
        let pattern = FuzzyPattern::compile(&n("calculators"));
        assert!(!pattern.matches(&n("calc")));
    }

    #[test]
    fn test_substring_implies_fuzzy_match() {
        let pattern = FuzzyPattern::compile(&n("lend"));
        assert!(pattern.matches(&n("Calendar")));
    }

    #[test]
    fn test_spaces_are_ordinary_characters() {
        let pattern = FuzzyPattern::compile(&n("g m"));
        assert!(pattern.matches(&n("Google Maps")));
        assert!(!pattern.matches(&n("GoogleMaps")));
    }

    #[test]
    fn test_diacritics_fold_on_both_sides() {
        let pattern = FuzzyPattern::compile(&n("cfe"));
        assert!(pattern.matches(&n("Café")));
    }

    #[test]
    fn test_query_matcher_exact_only() {
        let matcher = QueryMatcher::new(n("stng"), false);
        assert!(!matcher.is_fuzzy());
        assert!(!matcher.is_match(&n("Settings")));
        assert!(matcher.is_match(&n("Testing stng")));
    }

    #[test]
    fn test_query_matcher_fuzzy_enabled() {
        let matcher = QueryMatcher::new(n("stng"), true);
        assert!(matcher.is_fuzzy());
        assert!(matcher.is_match(&n("Settings")));
        assert!(!matcher.is_match(&n("Calendar")));
    }

    #[test]
    fn test_query_matcher_handles_non_ascii_candidates() {
        let matcher = QueryMatcher::new(n("ny"), true);
        assert!(matcher.is_match(&n("Ωmega Navy")));
        assert!(matcher.is_match(&n("New York")));
        assert!(!matcher.is_match(&n("Ωmega")));
    }

    #[test]
    fn test_every_code_point_takes_part() {
        assert!(FuzzyPattern::compile(&n("日本語")).matches(&n("日x本y語")));
        assert!(!FuzzyPattern::compile(&n("ѩѩ")).matches(&n("ѩ")));
        assert!(!FuzzyPattern::compile(&n("語本")).matches(&n("日本語")));
    }

    #[test]
    fn test_decomposed_accents_match_precomposed() {
        let nfd = n("Ista\u{0300}nbul");
        let nfc = n("Istànbul");
        assert_eq!(nfd, nfc);
        assert!(FuzzyPattern::compile(&n("İst")).matches(&nfc));
    }

    #[test]
    fn test_very_long_query_does_not_overflow() {
        let label = n(&"ab ".repeat(4000));
        let query = n(&"ab".repeat(4000));
        assert!(FuzzyPattern::compile(&query).matches(&label));
        assert!(QueryMatcher::new(query, true).is_match(&label));
    }
}
