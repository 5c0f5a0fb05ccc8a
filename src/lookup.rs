//! Lookup service: corpus store + prefix matcher behind one call
//!
//! Faults below this boundary (an unreadable word list, a panicking loader)
//! are converted into an empty envelope plus a fault message. Nothing
//! propagates to the caller as an error.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::corpus::CorpusStore;
use crate::query::find_prefix_matches;
use crate::utils::Settings;

/// Success status of the lookup endpoint
pub const STATUS_OK: u16 = 200;
/// Failure status of the lookup endpoint (corpus unavailable)
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Matches for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub results: Vec<String>,
    /// Set when the result count reached the limit; more matches may exist
    pub truncated: bool,
    pub min_query_length: usize,
}

impl ResultEnvelope {
    pub fn empty(min_query_length: usize) -> Self {
        Self {
            results: Vec::new(),
            truncated: false,
            min_query_length,
        }
    }

    pub fn from_matches(results: Vec<String>, limit: usize, min_query_length: usize) -> Self {
        let truncated = limit > 0 && results.len() == limit;
        Self {
            results,
            truncated,
            min_query_length,
        }
    }
}

/// Outcome of [`LookupService::lookup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub envelope: ResultEnvelope,
    /// Set when the corpus could not be obtained
    pub fault: Option<String>,
}

impl LookupResponse {
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// `meta` object of the endpoint body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteMeta {
    pub min_query_length: usize,
    pub truncated: bool,
}

/// JSON body of the lookup endpoint:
/// `{ "results": [...], "meta": { "minQueryLength": n, "truncated": b } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteBody {
    pub results: Vec<String>,
    pub meta: AutocompleteMeta,
}

impl From<ResultEnvelope> for AutocompleteBody {
    fn from(envelope: ResultEnvelope) -> Self {
        Self {
            results: envelope.results,
            meta: AutocompleteMeta {
                min_query_length: envelope.min_query_length,
                truncated: envelope.truncated,
            },
        }
    }
}

impl From<AutocompleteBody> for ResultEnvelope {
    fn from(body: AutocompleteBody) -> Self {
        Self {
            results: body.results,
            truncated: body.meta.truncated,
            min_query_length: body.meta.min_query_length,
        }
    }
}

/// Status code plus body, ready for any transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointReply {
    pub status: u16,
    pub body: AutocompleteBody,
}

impl EndpointReply {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Shared lookup entry point for the daemon, the TUI fallback and one-shot mode
pub struct LookupService {
    store: Arc<CorpusStore>,
    settings: Arc<Settings>,
}

impl LookupService {
    pub fn new(store: Arc<CorpusStore>, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    /// Match `query` against the corpus, loading it first if necessary.
    ///
    /// Every call recomputes the search; there is no per-query cache.
    pub fn lookup(&self, query: &str, limit: usize) -> LookupResponse {
        let min_query_length = self.settings.min_query_length;

        let corpus = match self.store.load() {
            Ok(corpus) => corpus,
            Err(e) => {
                error!(error = %e, "lookup failed: word list unavailable");
                return LookupResponse {
                    envelope: ResultEnvelope::empty(min_query_length),
                    fault: Some(e.to_string()),
                };
            }
        };

        let start = Instant::now();
        let matches = find_prefix_matches(corpus.words(), query, limit);
        debug!(
            query,
            matches = matches.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "lookup"
        );

        LookupResponse {
            envelope: ResultEnvelope::from_matches(matches, limit, min_query_length),
            fault: None,
        }
    }

    /// The lookup endpoint: raw `q` in, status and JSON body out.
    ///
    /// Queries shorter than the configured minimum (after trimming) return
    /// an empty success without touching the corpus.
    pub fn autocomplete(&self, raw_q: &str) -> EndpointReply {
        let query = raw_q.trim();

        if query.chars().count() < self.settings.min_query_length {
            return EndpointReply {
                status: STATUS_OK,
                body: ResultEnvelope::empty(self.settings.min_query_length).into(),
            };
        }

        let response = self.lookup(query, self.settings.max_autocomplete_results);
        let status = if response.is_fault() {
            STATUS_INTERNAL_ERROR
        } else {
            STATUS_OK
        };

        EndpointReply {
            status,
            body: response.envelope.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusError, CorpusSource};
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    struct MemorySource {
        text: &'static str,
        fail: Arc<AtomicBool>,
        reads: Arc<AtomicU64>,
    }

    impl CorpusSource for MemorySource {
        fn read(&self) -> Result<String, CorpusError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(CorpusError::Unavailable("disk on fire".to_string()))
            } else {
                Ok(self.text.to_string())
            }
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn service(text: &'static str, max: usize) -> (LookupService, Arc<AtomicBool>, Arc<AtomicU64>) {
        let fail = Arc::new(AtomicBool::new(false));
        let reads = Arc::new(AtomicU64::new(0));
        let source = MemorySource {
            text,
            fail: Arc::clone(&fail),
            reads: Arc::clone(&reads),
        };
        let settings = Settings {
            min_query_length: 2,
            max_autocomplete_results: max,
            ..Settings::default()
        };
        let service = LookupService::new(Arc::new(CorpusStore::new(source)), Arc::new(settings));
        (service, fail, reads)
    }

    const WORDS: &str = "app\napple\napplication\nbanana\n";

    #[test]
    fn test_lookup_not_truncated() {
        let (service, _, _) = service(WORDS, 10);
        let response = service.lookup("app", 10);

        assert!(!response.is_fault());
        assert_eq!(response.envelope.results, ["app", "apple", "application"]);
        assert!(!response.envelope.truncated);
        assert_eq!(response.envelope.min_query_length, 2);
    }

    #[test]
    fn test_lookup_truncated() {
        let (service, _, _) = service(WORDS, 10);
        let response = service.lookup("app", 2);

        assert_eq!(response.envelope.results, ["app", "apple"]);
        assert!(response.envelope.truncated);
    }

    #[test]
    fn test_lookup_exactly_limit_matches_is_truncated() {
        let (service, _, _) = service(WORDS, 10);
        let response = service.lookup("app", 3);

        assert_eq!(response.envelope.results.len(), 3);
        assert!(response.envelope.truncated);
    }

    #[test]
    fn test_lookup_fault_returns_empty_envelope() {
        let (service, fail, _) = service(WORDS, 10);
        fail.store(true, Ordering::SeqCst);

        let response = service.lookup("app", 10);
        assert!(response.is_fault());
        assert!(response.fault.unwrap().contains("disk on fire"));
        assert_eq!(response.envelope, ResultEnvelope::empty(2));
    }

    #[test]
    fn test_autocomplete_short_query_skips_corpus() {
        let (service, _, reads) = service(WORDS, 10);

        for q in ["", " ", "a", "  a  "] {
            let reply = service.autocomplete(q);
            assert_eq!(reply.status, STATUS_OK);
            assert!(reply.body.results.is_empty());
            assert!(!reply.body.meta.truncated);
            assert_eq!(reply.body.meta.min_query_length, 2);
        }
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_autocomplete_trims_and_caps() {
        let (service, _, _) = service(WORDS, 2);
        let reply = service.autocomplete("  APP ");

        assert!(reply.is_success());
        assert_eq!(reply.body.results, ["app", "apple"]);
        assert!(reply.body.meta.truncated);
    }

    #[test]
    fn test_autocomplete_fault_then_recovery() {
        let (service, fail, reads) = service(WORDS, 10);
        fail.store(true, Ordering::SeqCst);

        let reply = service.autocomplete("app");
        assert_eq!(reply.status, STATUS_INTERNAL_ERROR);
        assert!(reply.body.results.is_empty());
        assert!(!reply.body.meta.truncated);

        fail.store(false, Ordering::SeqCst);
        let reply = service.autocomplete("app");
        assert_eq!(reply.status, STATUS_OK);
        assert_eq!(reply.body.results.len(), 3);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_body_json_shape() {
        let body: AutocompleteBody =
            ResultEnvelope::from_matches(vec!["app".to_string()], 10, 2).into();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "results": ["app"],
                "meta": { "minQueryLength": 2, "truncated": false }
            })
        );
    }
}
