//! Word list parsing

use memchr::memchr_iter;

/// Split raw word list text into entries.
///
/// One entry per line; surrounding whitespace (including a trailing `\r`)
/// is trimmed and blank lines are dropped. Case, duplicates and order are
/// left exactly as the source has them.
pub fn parse_word_list(raw: &str) -> Vec<String> {
    let bytes = raw.as_bytes();
    let line_count = memchr_iter(b'\n', bytes).count() + 1;
    let mut words = Vec::with_capacity(line_count);

    let mut start = 0;
    for end in memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        // '\n' is ASCII, so both ends sit on char boundaries
        let line = raw[start..end].trim();
        if !line.is_empty() {
            words.push(line.to_string());
        }
        start = end + 1;
    }

    words
}
