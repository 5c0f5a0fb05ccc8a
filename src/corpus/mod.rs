//! Word corpus: parsing, sources and the load-once store.
//!
//! The corpus is an ordered list of words sorted ascending by
//! case-insensitive comparison. The order comes from the source data; it is
//! audited once after loading but never enforced.

mod parse;
mod source;
mod store;

pub use parse::parse_word_list;
pub use source::{CorpusSource, FileSource};
pub use store::{CorpusStore, LoadOutcome, LoadPhase};

use std::cmp::Ordering;
use std::path::PathBuf;

use thiserror::Error;

use crate::query::compare_folded;

/// Errors raised while loading the corpus
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read word list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("word list source unavailable: {0}")]
    Unavailable(String),

    #[error("word list load was interrupted")]
    Interrupted,
}

/// Immutable, ordered word list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    words: Vec<String>,
}

impl Corpus {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Parse raw line-delimited text
    pub fn from_text(raw: &str) -> Self {
        Self::new(parse_word_list(raw))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Approximate heap footprint in bytes
    pub fn memory_bytes(&self) -> u64 {
        let strings: usize = self.words.iter().map(|w| w.capacity()).sum();
        (strings + self.words.capacity() * std::mem::size_of::<String>()) as u64
    }

    /// Index of the first word that sorts before its predecessor under
    /// case-insensitive comparison, if any.
    pub fn first_unordered(&self) -> Option<usize> {
        self.words
            .windows(2)
            .position(|pair| compare_folded(&pair[0], &pair[1]) == Ordering::Greater)
            .map(|i| i + 1)
    }
}
