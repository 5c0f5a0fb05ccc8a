//! Performance benchmarks for word list loading and prefix matching
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wordfind::corpus::{Corpus, CorpusStore, FileSource, parse_word_list};
use wordfind::lookup::LookupService;
use wordfind::query::find_prefix_matches;
use wordfind::utils::Settings;

const SYLLABLES: [&str; 16] = [
    "ba", "ca", "de", "fo", "gi", "ha", "jo", "ka", "li", "mo", "nu", "pa", "ri", "so", "tu", "ve",
];

/// Deterministic, case-insensitively sorted synthetic word list
fn synthetic_words(count: usize) -> Vec<String> {
    let mut words: Vec<String> = (0..count)
        .map(|i| {
            let mut word = String::new();
            let mut n = i;
            for _ in 0..4 {
                word.push_str(SYLLABLES[n % SYLLABLES.len()]);
                n /= SYLLABLES.len();
            }
            if i % 7 == 0 {
                word[..1].to_uppercase() + &word[1..]
            } else {
                word
            }
        })
        .collect();
    words.sort_by_key(|w| w.to_lowercase());
    words.dedup_by_key(|w| w.to_lowercase());
    words
}

fn bench_prefix_matching(c: &mut Criterion) {
    let words = synthetic_words(65_536);
    let mut group = c.benchmark_group("prefix_matching");

    for query in ["ba", "caDe", "fogiha", "zz"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, q| {
            b.iter(|| find_prefix_matches(black_box(&words), black_box(q), 10))
        });
    }
    group.finish();
}

fn bench_word_list_parsing(c: &mut Criterion) {
    let text = synthetic_words(65_536).join("\r\n");

    c.bench_function("parse_word_list_64k", |b| {
        b.iter(|| parse_word_list(black_box(&text)))
    });

    let corpus = Corpus::new(parse_word_list(&text));
    c.bench_function("order_audit_64k", |b| b.iter(|| black_box(&corpus).first_unordered()));
}

fn bench_cold_lookup(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("words.txt");
    fs::write(&path, synthetic_words(65_536).join("\n")).expect("Failed to write word list");

    c.bench_function("cold_lookup_64k", |b| {
        b.iter(|| {
            let settings = Arc::new(Settings {
                word_list_path: path.clone(),
                ..Settings::default()
            });
            let store = Arc::new(CorpusStore::new(FileSource::new(&path)));
            LookupService::new(store, settings).autocomplete(black_box("caDe"))
        })
    });
}

criterion_group!(
    benches,
    bench_prefix_matching,
    bench_word_list_parsing,
    bench_cold_lookup
);
criterion_main!(benches);
