#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsed lines are trimmed and never empty
    let words = wordfind::corpus::parse_word_list(data);
    for word in &words {
        assert!(!word.is_empty());
        assert_eq!(word.trim(), word);
    }
    let _ = wordfind::corpus::Corpus::new(words).first_unordered();
});
