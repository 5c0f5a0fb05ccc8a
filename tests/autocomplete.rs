//! End-to-end tests for the lookup path: word list file -> corpus store ->
//! prefix matcher -> lookup endpoint -> query coordinator.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use wordfind::coordinator::{LocalSource, QueryCoordinator, SuggestionSource};
use wordfind::corpus::{CorpusStore, FileSource};
use wordfind::lookup::{LookupService, STATUS_INTERNAL_ERROR, STATUS_OK};
use wordfind::utils::Settings;

fn fixture_words() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("words.txt")
}

fn service_for(path: &Path, max_results: usize) -> Arc<LookupService> {
    let settings = Settings {
        min_query_length: 2,
        max_autocomplete_results: max_results,
        word_list_path: path.to_path_buf(),
        debounce: Duration::ZERO,
        verify_order: true,
    };
    let store = CorpusStore::new(FileSource::new(path)).with_order_audit(settings.verify_order);
    Arc::new(LookupService::new(Arc::new(store), Arc::new(settings)))
}

fn write_words(dir: &Path, words: &[&str]) -> PathBuf {
    let path = dir.join("words.txt");
    fs::write(&path, words.join("\n")).unwrap();
    path
}

#[test]
fn test_reference_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_words(dir.path(), &["app", "apple", "application", "banana"]);
    let service = service_for(&path, 10);

    let all = service.lookup("app", 10);
    assert_eq!(all.envelope.results, ["app", "apple", "application"]);
    assert!(!all.envelope.truncated);

    let capped = service.lookup("app", 2);
    assert_eq!(capped.envelope.results, ["app", "apple"]);
    assert!(capped.envelope.truncated);

    let none = service.lookup("xyz", 10);
    assert!(none.envelope.results.is_empty());
    assert!(!none.envelope.truncated);

    assert!(service.lookup("", 10).envelope.results.is_empty());
}

#[test]
fn test_short_query_never_reads_word_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_words(dir.path(), &["app", "apple"]);
    let service = service_for(&path, 10);

    for q in ["", "a", "  a  ", "\t"] {
        let reply = service.autocomplete(q);
        assert_eq!(reply.status, STATUS_OK);
        assert!(reply.body.results.is_empty());
        assert!(!reply.body.meta.truncated);
    }
    assert_eq!(service.store().reads(), 0);
    assert!(!service.store().is_loaded());
}

#[test]
fn test_fixture_matches_preserve_case_and_order() {
    let service = service_for(&fixture_words(), 10);

    let reply = service.autocomplete("CATA");
    assert_eq!(reply.status, STATUS_OK);
    assert_eq!(reply.body.results, ["catalog", "Catalonia", "catapult"]);

    let reply = service.autocomplete(" do ");
    assert_eq!(
        reply.body.results,
        ["dog", "doge", "dogma", "door", "doorbell", "dormant"]
    );

    let reply = service.autocomplete("apo");
    assert_eq!(reply.body.results, ["Apollo"]);
}

#[test]
fn test_fixture_is_in_folded_order() {
    let service = service_for(&fixture_words(), 10);
    service.autocomplete("zz");

    let corpus = service.store().loaded().unwrap();
    assert_eq!(corpus.first_unordered(), None);
}

#[test]
fn test_truncation_at_limit() {
    let service = service_for(&fixture_words(), 3);

    let reply = service.autocomplete("app");
    assert_eq!(reply.body.results, ["app", "apple", "applesauce"]);
    assert!(reply.body.meta.truncated);
    assert_eq!(reply.body.meta.min_query_length, 2);
}

#[test]
fn test_concurrent_first_requests_share_one_read() {
    let service = service_for(&fixture_words(), 10);
    let threads = 32;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let q = if i % 2 == 0 { "do" } else { "ap" };
                service.autocomplete(q)
            })
        })
        .collect();

    for handle in handles {
        let reply = handle.join().unwrap();
        assert_eq!(reply.status, STATUS_OK);
        assert!(!reply.body.results.is_empty());
    }
    assert_eq!(service.store().reads(), 1);
}

#[test]
fn test_missing_word_list_faults_then_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    let service = service_for(&path, 10);

    let reply = service.autocomplete("app");
    assert_eq!(reply.status, STATUS_INTERNAL_ERROR);
    assert!(reply.body.results.is_empty());
    assert!(!reply.body.meta.truncated);
    assert!(service.store().last_error().is_some());

    fs::write(&path, "app\napple\n").unwrap();

    let reply = service.autocomplete("app");
    assert_eq!(reply.status, STATUS_OK);
    assert_eq!(reply.body.results, ["app", "apple"]);
    assert_eq!(service.store().reads(), 2);

    // Cached from here on
    service.autocomplete("apple");
    assert_eq!(service.store().reads(), 2);
}

#[test]
fn test_endpoint_body_json_shape() {
    let service = service_for(&fixture_words(), 2);
    let reply = service.autocomplete("ban");

    let value = serde_json::to_value(&reply.body).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "results": ["banana", "bandana"],
            "meta": { "minQueryLength": 2, "truncated": true }
        })
    );
}

#[test]
fn test_coordinator_drops_superseded_reply() {
    let service = service_for(&fixture_words(), 10);
    let source: Arc<dyn SuggestionSource> = Arc::new(LocalSource::new(Arc::clone(&service)));
    let mut coordinator = QueryCoordinator::new(service.settings());
    let t0 = Instant::now();

    coordinator.set_input("do", t0);
    let first = coordinator.poll(t0).unwrap();
    coordinator.set_input("dog", t0);
    let second = coordinator.poll(t0).unwrap();

    // Run both lookups; the superseded one was cancelled before it started
    let first_result = source.fetch(&first.query, &first.token);
    assert!(first_result.is_err());
    let second_result = source.fetch(&second.query, &second.token).unwrap();

    assert!(coordinator.complete(second.generation, Ok(second_result)));
    assert!(!coordinator.complete(
        first.generation,
        first_result.map_err(|e| e.to_string())
    ));
    assert_eq!(coordinator.suggestions(), ["dog", "doge", "dogma"]);
}
