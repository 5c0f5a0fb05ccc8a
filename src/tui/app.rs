use crate::coordinator::{
    DaemonSource, Dispatch, Generation, LocalSource, QueryCoordinator, SuggestionSource,
};
use crate::lookup::{LookupService, ResultEnvelope};
use crate::server::{LookupClient, get_socket_path};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Upper bound on how long the event loop waits for input
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result from a background lookup
pub struct WorkerReply {
    pub generation: Generation,
    pub result: Result<ResultEnvelope, String>,
    pub elapsed: Duration,
}

/// Application state
pub struct App {
    pub coordinator: QueryCoordinator,
    source: Arc<dyn SuggestionSource>,
    reply_tx: Sender<WorkerReply>,
    reply_rx: Receiver<WorkerReply>,
    pub status_message: String,
    /// Word picked by the user, printed after the terminal is restored
    pub chosen: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Create the app, preferring a running daemon for warm lookups and
    /// falling back to an in-process lookup service. A daemon started with
    /// different settings is not used.
    pub fn new(service: Arc<LookupService>, use_daemon: bool) -> Self {
        let settings = service.settings().clone();

        if use_daemon {
            let socket_path = get_socket_path();
            if let Some(client) = LookupClient::connect_serving(&socket_path, &settings) {
                debug!("interactive session using lookup daemon");
                let mut app = Self::with_source(
                    QueryCoordinator::new(&settings),
                    Arc::new(DaemonSource::new(socket_path, client)),
                );
                app.status_message = "Connected to daemon".to_string();
                return app;
            }
        }

        let description = service.store().source_description();
        let mut app = Self::with_source(
            QueryCoordinator::new(&settings),
            Arc::new(LocalSource::new(service)),
        );
        app.status_message = format!("Word list: {}", description);
        app
    }

    pub fn with_source(coordinator: QueryCoordinator, source: Arc<dyn SuggestionSource>) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();
        Self {
            coordinator,
            source,
            reply_tx,
            reply_rx,
            status_message: String::new(),
            chosen: None,
            should_quit: false,
        }
    }

    pub fn source_label(&self) -> &'static str {
        self.source.label()
    }

    /// Apply finished lookups and fire the debounce timer if due
    /// (call this in event loop)
    pub fn tick(&mut self, now: Instant) {
        self.drain_replies();

        if let Some(dispatch) = self.coordinator.poll(now) {
            self.spawn_lookup(dispatch);
        }
    }

    /// How long the event loop may block waiting for input
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.coordinator
            .time_until_dispatch(now)
            .map_or(MAX_POLL_INTERVAL, |left| left.min(MAX_POLL_INTERVAL))
    }

    fn drain_replies(&mut self) {
        loop {
            match self.reply_rx.try_recv() {
                Ok(reply) => {
                    let count = reply.result.as_ref().ok().map(|e| e.results.len());
                    if self.coordinator.complete(reply.generation, reply.result) {
                        self.status_message = match count {
                            Some(count) => format!(
                                "{} matches ({:.1}ms, {})",
                                count,
                                reply.elapsed.as_secs_f64() * 1000.0,
                                self.source.label()
                            ),
                            None => "Lookup failed".to_string(),
                        };
                    } else {
                        debug!(generation = reply.generation, "discarding stale lookup reply");
                    }
                }
                Err(TryRecvError::Empty) => break,
                // The app holds a sender, so this cannot happen
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn spawn_lookup(&mut self, dispatch: Dispatch) {
        let source = Arc::clone(&self.source);
        let tx = self.reply_tx.clone();

        self.status_message = format!("Searching ({})...", self.source.label());

        thread::spawn(move || {
            let start = Instant::now();
            let result = source
                .fetch(&dispatch.query, &dispatch.token)
                .map_err(|e| {
                    if !dispatch.token.is_cancelled() {
                        warn!(query = %dispatch.query, error = %e, "lookup failed");
                    }
                    e.to_string()
                });

            let _ = tx.send(WorkerReply {
                generation: dispatch.generation,
                result,
                elapsed: start.elapsed(),
            });
        });
    }

    pub fn set_query(&mut self, query: &str) {
        self.coordinator.set_input(query, Instant::now());
    }

    pub fn push_char(&mut self, c: char) {
        self.coordinator.push_char(c, Instant::now());
    }

    pub fn pop_char(&mut self) {
        self.coordinator.pop_char(Instant::now());
    }

    pub fn delete_word(&mut self) {
        self.coordinator.delete_word(Instant::now());
    }

    pub fn select_next(&mut self) {
        self.coordinator.select_next();
    }

    pub fn select_prev(&mut self) {
        self.coordinator.select_prev();
    }

    /// Escape: close the panel, then clear the input, then quit
    pub fn escape(&mut self) {
        if self.coordinator.dropdown_visible() {
            self.coordinator.dismiss();
        } else if !self.coordinator.input().is_empty() {
            self.coordinator.clear();
        } else {
            self.should_quit = true;
        }
    }

    /// Tab: take the highlighted suggestion into the input
    pub fn accept(&mut self) {
        if let Some(word) = self.coordinator.accept_selection() {
            self.status_message = format!("Selected \"{}\"", word);
        }
    }

    /// Enter: take the highlighted suggestion, or finish with the input
    pub fn submit(&mut self) {
        if self.coordinator.selected().is_some() {
            self.accept();
            return;
        }
        let query = self.coordinator.trimmed_query();
        if !query.is_empty() {
            self.chosen = Some(query.to_string());
            self.should_quit = true;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{CancelToken, FetchError};
    use crate::utils::Settings;

    struct FixedSource(Vec<&'static str>);

    impl SuggestionSource for FixedSource {
        fn fetch(&self, query: &str, _token: &CancelToken) -> Result<ResultEnvelope, FetchError> {
            let results = self
                .0
                .iter()
                .filter(|w| w.starts_with(query))
                .map(|w| w.to_string())
                .collect();
            Ok(ResultEnvelope::from_matches(results, 10, 2))
        }

        fn label(&self) -> &'static str {
            "fixed"
        }
    }

    fn app() -> App {
        let settings = Settings {
            debounce: Duration::ZERO,
            ..Settings::default()
        };
        App::with_source(
            QueryCoordinator::new(&settings),
            Arc::new(FixedSource(vec!["cat", "catalog", "dog"])),
        )
    }

    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        app.tick(Instant::now());
        while app.is_loading() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
            app.tick(Instant::now());
        }
    }

    #[test]
    fn test_typing_fetches_suggestions() {
        let mut app = app();
        app.set_query("cat");
        settle(&mut app);

        assert_eq!(app.coordinator.suggestions(), ["cat", "catalog"]);
        assert!(app.status_message.starts_with("2 matches"));
    }

    #[test]
    fn test_submit_with_selection_accepts() {
        let mut app = app();
        app.set_query("cat");
        settle(&mut app);

        app.select_next();
        app.select_next();
        app.submit();
        assert_eq!(app.coordinator.input(), "catalog");
        assert!(!app.should_quit);

        app.submit();
        assert_eq!(app.chosen.as_deref(), Some("catalog"));
        assert!(app.should_quit);
    }

    #[test]
    fn test_escape_steps() {
        let mut app = app();
        app.set_query("cat");
        settle(&mut app);

        app.escape();
        assert!(!app.coordinator.dropdown_visible());
        assert_eq!(app.coordinator.input(), "cat");
        app.escape();
        assert_eq!(app.coordinator.input(), "");
        assert!(!app.should_quit);
        app.escape();
        assert!(app.should_quit);
        assert!(app.chosen.is_none());
    }

    #[test]
    fn test_poll_timeout_tracks_debounce() {
        let settings = Settings {
            debounce: Duration::from_millis(40),
            ..Settings::default()
        };
        let mut app = App::with_source(
            QueryCoordinator::new(&settings),
            Arc::new(FixedSource(vec![])),
        );
        let now = Instant::now();
        assert_eq!(app.poll_timeout(now), MAX_POLL_INTERVAL);

        app.coordinator.set_input("ca", now);
        assert_eq!(app.poll_timeout(now), Duration::from_millis(40));
    }

    #[test]
    fn test_failed_lookup_reported() {
        struct FailingSource;
        impl SuggestionSource for FailingSource {
            fn fetch(&self, _query: &str, _token: &CancelToken) -> Result<ResultEnvelope, FetchError> {
                Err(FetchError::Status(500))
            }
            fn label(&self) -> &'static str {
                "failing"
            }
        }

        let settings = Settings {
            debounce: Duration::ZERO,
            ..Settings::default()
        };
        let mut app = App::with_source(QueryCoordinator::new(&settings), Arc::new(FailingSource));
        app.set_query("cat");
        settle(&mut app);

        assert_eq!(app.status_message, "Lookup failed");
        assert!(app.coordinator.error().is_some());
        assert!(app.coordinator.suggestions().is_empty());
    }
}
