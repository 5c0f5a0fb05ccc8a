//! Protocol messages for client-server communication
//!
//! Uses a simple length-prefixed JSON protocol:
//! - 4 bytes (little-endian u32): message length
//! - N bytes: JSON-encoded message

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::lookup::EndpointReply;
use crate::utils::Settings;

/// Largest message either side will accept
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Request from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Run the lookup endpoint for a raw query
    Autocomplete {
        /// Raw text as typed; the server trims it
        q: String,
    },

    /// Check server health and get stats
    Status,

    /// Graceful shutdown request
    Shutdown,

    /// Ping for connection testing
    Ping,
}

/// Response from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Endpoint reply (status + body)
    Autocomplete(AutocompleteResponse),

    /// Server status
    Status(StatusResponse),

    /// Shutdown acknowledged
    ShuttingDown,

    /// Pong response
    Pong,

    /// Error response
    Error { message: String },
}

/// Lookup endpoint reply as sent over the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(flatten)]
    pub reply: EndpointReply,
    /// Server-side time in milliseconds
    pub duration_ms: f64,
}

/// Server status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Word list location
    pub word_list: PathBuf,
    /// Minimum query length the daemon enforces
    #[serde(default)]
    pub min_query_length: usize,
    /// Result cap the daemon applies
    #[serde(default)]
    pub max_results: usize,
    /// Corpus load phase ("unloaded", "loading", "loaded", "failed")
    pub corpus_state: String,
    /// Number of words once loaded
    pub words_loaded: usize,
    /// Physical reads of the word list so far
    pub corpus_reads: u64,
    /// Total queries served
    pub queries_served: u64,
    /// Queries answered with a failure status
    pub faults: u64,
    /// Memory usage in bytes (approximate)
    pub memory_bytes: u64,
    /// Most recent load error, if the last attempt failed
    #[serde(default)]
    pub last_error: Option<String>,
}

impl StatusResponse {
    /// Whether this daemon answers queries the way an in-process service
    /// built from `settings` would
    pub fn serves(&self, settings: &Settings) -> bool {
        self.min_query_length == settings.min_query_length
            && self.max_results == settings.max_autocomplete_results
            && std::path::absolute(&settings.word_list_path).is_ok_and(|p| p == self.word_list)
    }
}

/// Write a message to a stream with length prefix
pub fn write_message<W: Write>(writer: &mut W, msg: &impl Serialize) -> std::io::Result<()> {
    let json = serde_json::to_vec(msg).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    if json.len() > MAX_MESSAGE_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Message too large",
        ));
    }

    let len = json.len() as u32;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(())
}

/// Read a message from a stream with length prefix
pub fn read_message<R: Read, T: for<'de> Deserialize<'de>>(reader: &mut R) -> std::io::Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Message too large",
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    serde_json::from_slice(&buf).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })
}
