//! Free-text search over violation details

use crate::snapshot::{DetailsSource, ViolationId};
use std::collections::HashMap;
use tracing::trace;

/// Lowercased, whitespace-separated search terms
///
/// A violation matches when its details contain every term. No terms means
/// everything matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn parse(input: &str) -> Self {
        Self(
            input
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    /// `haystack` must already be lowercased (see [`DetailsCache`])
    pub fn matches(&self, haystack: &str) -> bool {
        self.0.iter().all(|term| haystack.contains(term.as_str()))
    }

    /// Terms joined by single spaces, as written to the `search` URL parameter
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// First non-blank line of a rendered text block, trimmed
pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Memoized, lowercased details text keyed by violation
///
/// Report text does not change after rendering, so entries are never
/// invalidated.
#[derive(Debug, Clone, Default)]
pub struct DetailsCache {
    entries: HashMap<ViolationId, String>,
}

impl DetailsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fetch<D: DetailsSource + ?Sized>(&mut self, id: ViolationId, source: &D) -> &str {
        self.entries.entry(id).or_insert_with(|| {
            trace!(violation = id.0, "caching details text");
            source.details_text(id).to_lowercase()
        })
    }

    pub fn contains(&self, id: ViolationId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl DetailsSource for CountingSource {
        fn details_text(&self, violation: ViolationId) -> String {
            self.calls.set(self.calls.get() + 1);
            format!("Violation #{} in Namespace KUBE-SYSTEM", violation.0)
        }
    }

    #[test]
    fn test_parse_lowercases_and_splits() {
        let terms = SearchTerms::parse("  Null   POINTER\tderef ");
        assert_eq!(terms.terms(), ["null", "pointer", "deref"]);
        assert_eq!(terms.joined(), "null pointer deref");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(SearchTerms::parse("").is_empty());
        assert!(SearchTerms::parse("   \n\t ").is_empty());
    }

    #[test]
    fn test_empty_terms_match_everything() {
        let terms = SearchTerms::parse("");
        assert!(terms.matches(""));
        assert!(terms.matches("anything at all"));
    }

    #[test]
    fn test_all_terms_required() {
        let terms = SearchTerms::parse("pointer null");
        assert!(terms.matches("null pointer dereference"));
        assert!(!terms.matches("null reference"));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n   \n  Deprecated API  \nsecond line"), "Deprecated API");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_cache_fetches_once_and_lowercases() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let mut cache = DetailsCache::new();

        let text = cache.get_or_fetch(ViolationId(2), &source).to_string();
        assert_eq!(text, "violation #2 in namespace kube-system");
        cache.get_or_fetch(ViolationId(2), &source);
        cache.get_or_fetch(ViolationId(2), &source);

        assert_eq!(source.calls.get(), 1);
        assert!(cache.contains(ViolationId(2)));
        assert!(!cache.contains(ViolationId(3)));
        assert_eq!(cache.len(), 1);
    }
}
