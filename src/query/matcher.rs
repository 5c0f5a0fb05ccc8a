//! Case-insensitive prefix matching over a sorted word list
//!
//! The slice must be sorted ascending by case-insensitive comparison. That
//! precondition is trusted: with an unsorted slice the lower bound lands in
//! the wrong place and matches are silently missed.

use std::cmp::Ordering;

/// Lowercased characters of `s`, without allocating
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Normalize a query the same way corpus entries are compared
pub fn normalize_query(raw: &str) -> String {
    folded(raw).collect()
}

/// Case-insensitive ordering of two words
pub fn compare_folded(a: &str, b: &str) -> Ordering {
    folded(a).cmp(folded(b))
}

/// Whether `word`, lowercased, starts with the already-normalized `prefix`
fn has_folded_prefix(word: &str, prefix: &str) -> bool {
    let mut lowered = folded(word);
    prefix.chars().all(|p| lowered.next() == Some(p))
}

/// First index whose lowercased word is `>=` the normalized query
fn lower_bound(words: &[String], normalized: &str) -> usize {
    words.partition_point(|word| folded(word).lt(normalized.chars()))
}

/// Find up to `limit` words that start with `raw_query`, ignoring case.
///
/// Results keep corpus order and stored casing. An exact match comes first
/// since it sorts before its extensions. Empty queries and a zero limit
/// yield nothing.
pub fn find_prefix_matches(words: &[String], raw_query: &str, limit: usize) -> Vec<String> {
    let normalized = normalize_query(raw_query);
    if normalized.is_empty() || limit == 0 {
        return Vec::new();
    }

    let start = lower_bound(words, &normalized);

    // Sorted input: the first non-match ends the matching range
    words[start..]
        .iter()
        .take_while(|word| has_folded_prefix(word, &normalized))
        .take(limit)
        .cloned()
        .collect()
}

/// Byte length of the part of `word` matched by `raw_query`, or `None` when
/// the word does not start with the query. Used to highlight the typed prefix.
pub fn matched_prefix_len(word: &str, raw_query: &str) -> Option<usize> {
    let normalized = normalize_query(raw_query);
    let mut expected = normalized.chars();

    let mut end = 0;
    for (idx, ch) in word.char_indices() {
        if expected.as_str().is_empty() {
            return Some(idx);
        }
        for lower in ch.to_lowercase() {
            match expected.next() {
                Some(e) if e == lower => {}
                // Query ended inside a multi-char lowercase expansion
                None => return Some(idx + ch.len_utf8()),
                Some(_) => return None,
            }
        }
        end = idx + ch.len_utf8();
    }

    if expected.as_str().is_empty() {
        Some(end)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(words: &[&str]) -> Vec<String> {
        let mut words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        words.sort_by(|a, b| compare_folded(a, b));
        words
    }

    #[test]
    fn test_scenario_limit_not_reached() {
        let words = corpus(&["apple", "app", "application", "banana"]);
        assert_eq!(words, ["app", "apple", "application", "banana"]);
        assert_eq!(find_prefix_matches(&words, "app", 10), ["app", "apple", "application"]);
    }

    #[test]
    fn test_scenario_limit_reached() {
        let words = corpus(&["apple", "app", "application", "banana"]);
        assert_eq!(find_prefix_matches(&words, "app", 2), ["app", "apple"]);
    }

    #[test]
    fn test_no_match() {
        let words = corpus(&["apple", "app", "application", "banana"]);
        assert!(find_prefix_matches(&words, "xyz", 10).is_empty());
        // Sorts between entries but matches nothing
        assert!(find_prefix_matches(&words, "apq", 10).is_empty());
    }

    #[test]
    fn test_empty_query_and_zero_limit() {
        let words = corpus(&["app", "apple"]);
        assert!(find_prefix_matches(&words, "", 10).is_empty());
        assert!(find_prefix_matches(&words, "app", 0).is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        assert!(find_prefix_matches(&[], "app", 10).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let words = corpus(&["Apple", "apricot", "APPLAUSE", "banana", "Appetite"]);
        let lower = find_prefix_matches(&words, "app", 10);
        let upper = find_prefix_matches(&words, "APP", 10);
        let mixed = find_prefix_matches(&words, "aPp", 10);

        assert_eq!(lower, ["Appetite", "APPLAUSE", "Apple"]);
        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_exact_match_first() {
        let words = corpus(&["cat", "catalog", "category", "cats", "dog"]);
        assert_eq!(find_prefix_matches(&words, "cat", 10)[0], "cat");
    }

    #[test]
    fn test_match_at_end_of_corpus() {
        let words = corpus(&["alpha", "beta", "zeta", "zetas"]);
        assert_eq!(find_prefix_matches(&words, "zet", 10), ["zeta", "zetas"]);
        assert_eq!(find_prefix_matches(&words, "zetass", 10), Vec::<String>::new());
    }

    #[test]
    fn test_soundness_and_completeness() {
        let words = corpus(&[
            "a", "ab", "abc", "abd", "Abe", "b", "ba", "bab", "BAC", "c", "ca", "cab",
        ]);

        for query in ["a", "ab", "B", "ba", "c", "cab", "d", "abcd"] {
            let expected: Vec<String> = words
                .iter()
                .filter(|w| w.to_lowercase().starts_with(&query.to_lowercase()))
                .cloned()
                .collect();

            for limit in 1..=6 {
                let found = find_prefix_matches(&words, query, limit);
                let want: Vec<String> = expected.iter().take(limit).cloned().collect();
                assert_eq!(found, want, "query {:?} limit {}", query, limit);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let words = corpus(&["do", "dog", "dogma", "door"]);
        let first = find_prefix_matches(&words, "do", 3);
        let second = find_prefix_matches(&words, "do", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_ascii() {
        let words = corpus(&["éclair", "Écrit", "ecru", "zèbre"]);
        assert_eq!(find_prefix_matches(&words, "éc", 10), ["éclair", "Écrit"]);
        assert_eq!(find_prefix_matches(&words, "ÉC", 10), ["éclair", "Écrit"]);
    }

    #[test]
    fn test_compare_folded() {
        assert_eq!(compare_folded("Apple", "apple"), Ordering::Equal);
        assert_eq!(compare_folded("app", "Apple"), Ordering::Less);
        assert_eq!(compare_folded("Banana", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_matched_prefix_len() {
        assert_eq!(matched_prefix_len("Application", "app"), Some(3));
        assert_eq!(matched_prefix_len("app", "APP"), Some(3));
        assert_eq!(matched_prefix_len("app", "apple"), None);
        assert_eq!(matched_prefix_len("banana", "app"), None);
        assert_eq!(matched_prefix_len("Écrit", "éc"), Some("Éc".len()));
        assert_eq!(matched_prefix_len("anything", ""), Some(0));
    }
}
