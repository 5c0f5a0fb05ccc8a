//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - Application data directory and configuration (XDG-compliant)
//!
//! ## Key Functions
//!
//! ```no_run
//! use wordfind::utils::AppConfig;
//!
//! // File, then environment, then validation
//! let mut config = AppConfig::load().unwrap();
//! config.apply_env().unwrap();
//! let settings = config.resolve().unwrap();
//! assert!(settings.max_autocomplete_results > 0);
//! ```

pub mod app_data;

pub use app_data::*;
