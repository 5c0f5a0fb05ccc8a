//! Load-once corpus cache with single-flight loading
//!
//! The store owns one state slot. The first caller to find it empty becomes
//! the loader and performs the physical read outside the lock; callers that
//! arrive while the load is running wait on the same flight and receive the
//! same outcome. A failed load leaves nothing cached, so the next call starts
//! over.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::corpus::{Corpus, CorpusError, CorpusSource};

/// Shared result of one load attempt
pub type LoadOutcome = Result<Arc<Corpus>, Arc<CorpusError>>;

/// Externally visible load phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl LoadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPhase::Unloaded => "unloaded",
            LoadPhase::Loading => "loading",
            LoadPhase::Loaded => "loaded",
            LoadPhase::Failed => "failed",
        }
    }
}

enum LoadState {
    Unloaded,
    Loading(Arc<Flight>),
    Loaded(Arc<Corpus>),
    /// Last attempt failed; the next `load` retries from scratch
    Failed(Arc<CorpusError>),
}

/// One outstanding load that any number of callers can wait on
#[derive(Default)]
struct Flight {
    outcome: Mutex<Option<LoadOutcome>>,
    done: Condvar,
}

impl Flight {
    fn wait(&self) -> LoadOutcome {
        let guard = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        let guard = self
            .done
            .wait_while(guard, |outcome| outcome.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(outcome) => outcome.clone(),
            None => Err(Arc::new(CorpusError::Interrupted)),
        }
    }

    fn complete(&self, outcome: LoadOutcome) {
        let mut guard = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(outcome);
        self.done.notify_all();
    }
}

/// Process-lifetime cache for the word corpus
pub struct CorpusStore {
    source: Box<dyn CorpusSource>,
    verify_order: bool,
    state: Mutex<LoadState>,
    /// Physical reads performed, successful or not
    reads: AtomicU64,
}

impl CorpusStore {
    pub fn new(source: impl CorpusSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            verify_order: true,
            state: Mutex::new(LoadState::Unloaded),
            reads: AtomicU64::new(0),
        }
    }

    /// Enable or disable the post-load order audit
    pub fn with_order_audit(mut self, enabled: bool) -> Self {
        self.verify_order = enabled;
        self
    }

    /// Description of the underlying source
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Return the corpus, loading it first if nobody has yet.
    ///
    /// Concurrent callers share a single physical read. Errors are shared
    /// with every waiter of the failed attempt and are not cached.
    pub fn load(&self) -> LoadOutcome {
        let mut state = self.lock_state();

        if let LoadState::Loaded(corpus) = &*state {
            return Ok(Arc::clone(corpus));
        }
        if let LoadState::Loading(flight) = &*state {
            let flight = Arc::clone(flight);
            drop(state);
            debug!("waiting on in-progress word list load");
            return flight.wait();
        }

        let flight = Arc::new(Flight::default());
        *state = LoadState::Loading(Arc::clone(&flight));
        drop(state);

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.read_corpus())) {
            Ok(result) => result.map(Arc::new).map_err(Arc::new),
            Err(_) => Err(Arc::new(CorpusError::Interrupted)),
        };

        {
            let mut state = self.lock_state();
            *state = match &outcome {
                Ok(corpus) => LoadState::Loaded(Arc::clone(corpus)),
                Err(e) => LoadState::Failed(Arc::clone(e)),
            };
        }
        flight.complete(outcome.clone());

        outcome
    }

    /// The cached corpus, without triggering a load
    pub fn loaded(&self) -> Option<Arc<Corpus>> {
        match &*self.lock_state() {
            LoadState::Loaded(corpus) => Some(Arc::clone(corpus)),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.phase() == LoadPhase::Loaded
    }

    pub fn phase(&self) -> LoadPhase {
        match &*self.lock_state() {
            LoadState::Unloaded => LoadPhase::Unloaded,
            LoadState::Loading(_) => LoadPhase::Loading,
            LoadState::Loaded(_) => LoadPhase::Loaded,
            LoadState::Failed(_) => LoadPhase::Failed,
        }
    }

    /// Message of the most recent failed attempt, until a retry starts
    pub fn last_error(&self) -> Option<String> {
        match &*self.lock_state() {
            LoadState::Failed(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Number of physical reads issued against the source
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    fn read_corpus(&self) -> Result<Corpus, CorpusError> {
        let start = Instant::now();
        let source = self.source.describe();
        self.reads.fetch_add(1, Ordering::Relaxed);
        info!(source = %source, "loading word list");

        let raw = match self.source.read() {
            Ok(raw) => raw,
            Err(e) => {
                error!(source = %source, error = %e, "word list load failed");
                return Err(e);
            }
        };
        let corpus = Corpus::from_text(&raw);

        if self.verify_order
            && let Some(index) = corpus.first_unordered()
        {
            let words = corpus.words();
            warn!(
                source = %source,
                line = index + 1,
                previous = %words[index - 1],
                word = %words[index],
                "word list is not sorted case-insensitively; prefix matches may be incomplete"
            );
        }

        info!(
            source = %source,
            words = corpus.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "word list loaded"
        );
        Ok(corpus)
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
