#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wordfind::query::{compare_folded, find_prefix_matches, normalize_query};

#[derive(Arbitrary, Debug)]
struct Input {
    words: Vec<String>,
    query: String,
    limit: u8,
}

fuzz_target!(|input: Input| {
    let mut words = input.words;
    words.sort_by(|a, b| compare_folded(a, b));

    let limit = input.limit as usize;
    let matches = find_prefix_matches(&words, &input.query, limit);
    let needle = normalize_query(&input.query);

    assert!(matches.len() <= limit);
    if needle.is_empty() {
        assert!(matches.is_empty());
        return;
    }

    // Sound: every result starts with the folded query
    for word in &matches {
        assert!(normalize_query(word).starts_with(&needle));
    }

    // Complete up to the limit
    let expected: Vec<&String> = words
        .iter()
        .filter(|w| normalize_query(w).starts_with(&needle))
        .take(limit)
        .collect();
    assert_eq!(matches.iter().collect::<Vec<_>>(), expected);
});
