//! Query coordinator: keystrokes in, suggestion state out.
//!
//! ```text
//!   Idle ──keystroke (long enough)──▶ Debouncing ──timer──▶ InFlight
//!    ▲                                   ▲                     │
//!    │ short query / accept / dismiss    │ keystroke           │ reply for the
//!    │                                   │ (restarts)          ▼ current generation
//!    └───────────────────────────────── Settled(Success | Failure)
//! ```
//!
//! Every query that reaches `Debouncing` gets a fresh generation number and
//! cancel token. Starting a new query cancels the previous token, and
//! [`QueryCoordinator::complete`] drops any reply whose generation is not the
//! current one, so a slow reply for "do" can never overwrite the results of
//! a later "dog" regardless of arrival order.
//!
//! The machine never sleeps or spawns. Callers pass `Instant`s in, drive the
//! timer with [`QueryCoordinator::poll`], run the returned [`Dispatch`]
//! wherever they like and feed the outcome back.

mod source;

pub use source::{CancelToken, DaemonSource, FetchError, LocalSource, SuggestionSource};

use std::time::{Duration, Instant};

use crate::lookup::ResultEnvelope;
use crate::utils::Settings;

/// Identifies one logical query; larger is newer
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing { deadline: Instant },
    InFlight,
    Settled(Outcome),
}

/// A lookup the caller should run now
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub generation: Generation,
    pub query: String,
    pub token: CancelToken,
}

/// The one pending request, debouncing or in flight
#[derive(Debug)]
struct Pending {
    query: String,
    token: CancelToken,
}

pub struct QueryCoordinator {
    min_query_length: usize,
    max_results: usize,
    debounce: Duration,

    input: String,
    phase: Phase,
    generation: Generation,
    pending: Option<Pending>,

    suggestions: Vec<String>,
    truncated: bool,
    error: Option<String>,
    selected: Option<usize>,
}

impl QueryCoordinator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            min_query_length: settings.min_query_length,
            max_results: settings.max_autocomplete_results,
            debounce: settings.debounce,
            input: String::new(),
            phase: Phase::Idle,
            generation: 0,
            pending: None,
            suggestions: Vec::new(),
            truncated: false,
            error: None,
            selected: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The input as it is sent to the lookup service
    pub fn trimmed_query(&self) -> &str {
        self.input.trim()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_suggestion(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Debouncing { .. } | Phase::InFlight)
    }

    fn query_len(&self) -> usize {
        self.trimmed_query().chars().count()
    }

    /// Whether the suggestion panel has anything to show: a spinner, an
    /// error, a result list or an explicit "no matches"
    pub fn dropdown_visible(&self) -> bool {
        self.query_len() >= self.min_query_length && self.phase != Phase::Idle
    }

    /// Hint shown under the input, if any
    pub fn helper_message(&self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        let len = self.query_len();
        if len > 0 && len < self.min_query_length {
            let missing = self.min_query_length - len;
            let plural = if missing > 1 { "s" } else { "" };
            return Some(format!("Type {} more character{}", missing, plural));
        }
        if self.truncated {
            return Some(format!("Showing top {} results", self.max_results));
        }
        None
    }

    /// Replace the input text (one keystroke, paste, or edit).
    ///
    /// Edits that leave the trimmed query unchanged only update the text.
    pub fn set_input(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        let changed = text.trim() != self.trimmed_query();
        self.input = text;
        if changed {
            self.restart(now);
        }
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut text = std::mem::take(&mut self.input);
        text.push(c);
        self.set_input(text, now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        let mut text = std::mem::take(&mut self.input);
        text.pop();
        self.set_input(text, now);
    }

    /// Delete the last word (and any whitespace after it)
    pub fn delete_word(&mut self, now: Instant) {
        let trimmed_end = self.input.trim_end();
        let cut = trimmed_end
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed_end[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let text = self.input[..cut].to_string();
        self.set_input(text, now);
    }

    /// A new logical query: cancel whatever was pending and start over
    fn restart(&mut self, now: Instant) {
        self.cancel_pending();
        self.generation += 1;
        self.selected = None;

        if self.query_len() < self.min_query_length {
            self.suggestions.clear();
            self.truncated = false;
            self.error = None;
            self.phase = Phase::Idle;
            return;
        }

        self.error = None;
        self.pending = Some(Pending {
            query: self.trimmed_query().to_string(),
            token: CancelToken::new(),
        });
        self.phase = Phase::Debouncing {
            deadline: now + self.debounce,
        };
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }

    /// Time left on the debounce timer
    pub fn time_until_dispatch(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            Phase::Debouncing { deadline } => Some(deadline.saturating_duration_since(now)),
            _ => None,
        }
    }

    /// Fire the debounce timer if it is due, returning the lookup to run
    pub fn poll(&mut self, now: Instant) -> Option<Dispatch> {
        let Phase::Debouncing { deadline } = self.phase else {
            return None;
        };
        if now < deadline {
            return None;
        }
        let pending = self.pending.as_ref()?;

        self.phase = Phase::InFlight;
        Some(Dispatch {
            generation: self.generation,
            query: pending.query.clone(),
            token: pending.token.clone(),
        })
    }

    /// Apply the outcome of a dispatched lookup.
    ///
    /// Returns `false` (and changes nothing) when the reply belongs to a
    /// superseded or cancelled request.
    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<ResultEnvelope, String>,
    ) -> bool {
        if generation != self.generation || self.phase != Phase::InFlight {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.token.is_cancelled() {
            return false;
        }

        match result {
            Ok(envelope) => {
                self.suggestions = envelope.results;
                self.truncated = envelope.truncated;
                self.error = None;
                self.phase = Phase::Settled(Outcome::Success);
            }
            Err(message) => {
                self.suggestions.clear();
                self.truncated = false;
                self.error = Some(message);
                self.phase = Phase::Settled(Outcome::Failure);
            }
        }
        true
    }

    fn can_navigate(&self) -> bool {
        self.phase == Phase::Settled(Outcome::Success) && !self.suggestions.is_empty()
    }

    /// Move the highlight down, wrapping to the top
    pub fn select_next(&mut self) {
        if !self.can_navigate() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.selected = match self.selected {
            Some(i) if i < last => Some(i + 1),
            _ => Some(0),
        };
    }

    /// Move the highlight up, wrapping to the bottom
    pub fn select_prev(&mut self) {
        if !self.can_navigate() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.selected = match self.selected {
            Some(i) if i > 0 => Some(i - 1),
            _ => Some(last),
        };
    }

    /// Highlight a specific row (mouse hover)
    pub fn hover(&mut self, index: usize) {
        if self.can_navigate() && index < self.suggestions.len() {
            self.selected = Some(index);
        }
    }

    /// Accept the highlighted suggestion, if any (Enter / Tab)
    pub fn accept_selection(&mut self) -> Option<String> {
        let chosen = self.selected_suggestion()?.to_string();
        self.choose(&chosen);
        Some(chosen)
    }

    /// Put `suggestion` in the input and collapse to `Idle` without a lookup
    pub fn choose(&mut self, suggestion: &str) {
        self.cancel_pending();
        self.generation += 1;
        self.input = suggestion.to_string();
        self.reset_results();
    }

    /// Close the suggestion panel (Escape), keeping the input
    pub fn dismiss(&mut self) {
        self.cancel_pending();
        self.generation += 1;
        self.suggestions.clear();
        self.selected = None;
        self.phase = Phase::Idle;
    }

    /// Clear the input and every piece of state
    pub fn clear(&mut self) {
        self.cancel_pending();
        self.generation += 1;
        self.input.clear();
        self.reset_results();
    }

    fn reset_results(&mut self) {
        self.suggestions.clear();
        self.truncated = false;
        self.error = None;
        self.selected = None;
        self.phase = Phase::Idle;
    }
}
