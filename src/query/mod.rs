//! Prefix matching
//!
//! This module provides:
//! - Query normalization (lowercasing)
//! - Binary-search range matching over a sorted word list
//! - Prefix span computation for highlighting

mod matcher;

pub use matcher::{
    compare_folded, find_prefix_matches, matched_prefix_len, normalize_query,
};
