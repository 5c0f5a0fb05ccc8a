//! # wordfind - as-you-type prefix search over a word list
//!
//! wordfind suggests words from a large, sorted, line-delimited word list
//! while the user types. The list is loaded once per process, matched with a
//! binary search on the case-folded prefix, and served either in-process or
//! from a small daemon that keeps it warm.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`corpus`] - Word list loading (single-flight, cached for the process lifetime)
//! - [`query`] - Case-insensitive prefix matching over the sorted list
//! - [`lookup`] - Lookup service and endpoint reply shaping
//! - [`coordinator`] - Keystroke debouncing, request generations and UI state
//! - [`server`] - Persistent daemon, client and wire protocol
//! - [`tui`] - Interactive terminal UI
//! - [`output`] - One-shot result printing
//! - [`utils`] - Configuration and app data paths
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wordfind::corpus::{CorpusStore, FileSource};
//! use wordfind::lookup::LookupService;
//! use wordfind::utils::Settings;
//!
//! let settings = Arc::new(Settings::default());
//! let store = Arc::new(CorpusStore::new(FileSource::new(&settings.word_list_path)));
//! let service = LookupService::new(store, settings);
//!
//! let reply = service.autocomplete("app");
//! for word in &reply.body.results {
//!     println!("{}", word);
//! }
//! ```

pub mod coordinator;
pub mod corpus;
pub mod logging;
pub mod lookup;
pub mod output;
pub mod query;
pub mod server;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
