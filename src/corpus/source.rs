//! Where the raw word list comes from

use std::fs;
use std::path::{Path, PathBuf};

use crate::corpus::CorpusError;

/// A persistent source of word list text.
///
/// The store calls [`CorpusSource::read`] at most once per successful load;
/// implementations do not need their own caching.
pub trait CorpusSource: Send + Sync {
    /// Read the whole word list as UTF-8 text
    fn read(&self) -> Result<String, CorpusError>;

    /// Human-readable location, used in logs and status output
    fn describe(&self) -> String;
}

/// Word list stored in a UTF-8 text file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for FileSource {
    fn read(&self) -> Result<String, CorpusError> {
        fs::read_to_string(&self.path).map_err(|source| CorpusError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
