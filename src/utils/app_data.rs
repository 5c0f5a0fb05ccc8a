use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_NAME: &str = "wordfind";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the minimum query length
pub const ENV_MIN_QUERY_LENGTH: &str = "MIN_QUERY_LENGTH";
/// Environment variable overriding the per-query result cap
pub const ENV_MAX_AUTOCOMPLETE_RESULTS: &str = "MAX_AUTOCOMPLETE_RESULTS";
/// Environment variable overriding the word list location
pub const ENV_WORD_LIST_PATH: &str = "MAX_AUTOCOMPLETE_WORD_LIST_PATH";
/// Environment variable overriding the keystroke debounce delay
pub const ENV_DEBOUNCE_MS: &str = "AUTOCOMPLETE_DEBOUNCE_MS";

/// Configuration errors, reported once at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("word list path is empty")]
    EmptyWordListPath,
}

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Minimum number of characters before a lookup is dispatched
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Hard cap on suggestions returned per query
    #[serde(default = "default_max_autocomplete_results")]
    pub max_autocomplete_results: usize,

    /// Line-delimited word list, relative paths resolve against the working directory
    #[serde(default = "default_word_list_path")]
    pub word_list_path: PathBuf,

    /// Delay between the last keystroke and the lookup
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Audit the word list order once after loading
    #[serde(default = "default_verify_order")]
    pub verify_order: bool,
}

fn default_min_query_length() -> usize {
    2
}

fn default_max_autocomplete_results() -> usize {
    10
}

fn default_word_list_path() -> PathBuf {
    PathBuf::from("data").join("words.txt")
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_verify_order() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
            max_autocomplete_results: default_max_autocomplete_results(),
            word_list_path: default_word_list_path(),
            debounce_ms: default_debounce_ms(),
            verify_order: default_verify_order(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<PathBuf> {
        let app_dir = get_app_data_dir()?;
        let config_path = app_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MIN_QUERY_LENGTH) {
            self.min_query_length = parse_number(ENV_MIN_QUERY_LENGTH, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_AUTOCOMPLETE_RESULTS) {
            self.max_autocomplete_results = parse_number(ENV_MAX_AUTOCOMPLETE_RESULTS, &value)?;
        }
        if let Some(value) = lookup(ENV_WORD_LIST_PATH) {
            self.word_list_path = PathBuf::from(value.trim());
        }
        if let Some(value) = lookup(ENV_DEBOUNCE_MS) {
            self.debounce_ms = parse_number(ENV_DEBOUNCE_MS, &value)?;
        }
        Ok(())
    }

    /// Freeze into validated runtime settings
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let settings = Settings {
            min_query_length: self.min_query_length,
            max_autocomplete_results: self.max_autocomplete_results,
            word_list_path: self.word_list_path,
            debounce: Duration::from_millis(self.debounce_ms),
            verify_order: self.verify_order,
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

/// Immutable runtime settings, resolved once and shared by the lookup
/// service, the daemon and the query coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub min_query_length: usize,
    pub max_autocomplete_results: usize,
    pub word_list_path: PathBuf,
    pub debounce: Duration,
    pub verify_order: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let config = AppConfig::default();
        Settings {
            min_query_length: config.min_query_length,
            max_autocomplete_results: config.max_autocomplete_results,
            word_list_path: config.word_list_path,
            debounce: Duration::from_millis(config.debounce_ms),
            verify_order: config.verify_order,
        }
    }
}

impl Settings {
    /// Reject configurations that would silently break every request
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_query_length == 0 {
            return Err(ConfigError::NotPositive(ENV_MIN_QUERY_LENGTH));
        }
        if self.max_autocomplete_results == 0 {
            return Err(ConfigError::NotPositive(ENV_MAX_AUTOCOMPLETE_RESULTS));
        }
        if self.word_list_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyWordListPath);
        }
        Ok(())
    }
}

/// Get the path to the config file, if an app data location exists
pub fn get_config_path() -> Option<PathBuf> {
    app_data_base().map(|base| base.join(APP_NAME).join(CONFIG_FILE))
}

/// Get the application data directory, creating it if needed
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = app_data_base().context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Get the path of a log file inside the app data directory
pub fn get_log_path(file_name: &str) -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(file_name))
}

fn app_data_base() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    }
}
