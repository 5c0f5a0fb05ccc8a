//! Client for connecting to the lookup daemon

use crate::server::get_socket_path;
use crate::server::protocol::{
    read_message, write_message, AutocompleteResponse, Request, Response, StatusResponse,
};
use std::io::{BufReader, BufWriter};
use std::os::unix::net::UnixStream;
use std::path::Path;
use crate::utils::Settings;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server is not running
    #[error("Lookup daemon is not running")]
    NotRunning,
    /// Communication error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Server returned an error
    #[error("Server error: {0}")]
    ServerError(String),
    /// Invalid response
    #[error("Invalid response from server")]
    InvalidResponse,
}

/// Client for the lookup daemon
pub struct LookupClient {
    reader: BufReader<UnixStream>,
    writer: BufWriter<UnixStream>,
}

impl LookupClient {
    /// Try to connect to the running daemon
    /// Returns None if daemon is not running (allowing fallback to direct mode)
    pub fn connect() -> Option<Self> {
        Self::connect_to(&get_socket_path())
    }

    /// Connect to a daemon listening on a specific socket
    pub fn connect_to(socket_path: &Path) -> Option<Self> {
        // Quick check if socket exists
        if !socket_path.exists() {
            return None;
        }

        let stream = UnixStream::connect(socket_path).ok()?;

        let _ = stream.set_read_timeout(Some(IO_TIMEOUT));
        let _ = stream.set_write_timeout(Some(IO_TIMEOUT));

        let reader = BufReader::new(stream.try_clone().ok()?);
        let writer = BufWriter::new(stream);

        Some(Self { reader, writer })
    }

    /// Connect only if the daemon at `socket_path` answers with the same
    /// word list, minimum length and result cap as `settings`
    pub fn connect_serving(socket_path: &Path, settings: &Settings) -> Option<Self> {
        let mut client = Self::connect_to(socket_path)?;
        let status = client.status().ok()?;
        if status.serves(settings) {
            Some(client)
        } else {
            debug!(
                daemon_word_list = %status.word_list.display(),
                daemon_min_query_length = status.min_query_length,
                daemon_max_results = status.max_results,
                "daemon settings differ, answering in-process"
            );
            None
        }
    }

    /// Connect or return an error (for when daemon is required)
    pub fn connect_required() -> ClientResult<Self> {
        Self::connect().ok_or(ClientError::NotRunning)
    }

    fn round_trip(&mut self, request: &Request) -> ClientResult<Response> {
        write_message(&mut self.writer, request)?;
        Ok(read_message(&mut self.reader)?)
    }

    /// Call the lookup endpoint
    pub fn autocomplete(&mut self, q: &str) -> ClientResult<AutocompleteResponse> {
        let request = Request::Autocomplete { q: q.to_string() };

        match self.round_trip(&request)? {
            Response::Autocomplete(reply) => Ok(reply),
            Response::Error { message } => Err(ClientError::ServerError(message)),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Get server status
    pub fn status(&mut self) -> ClientResult<StatusResponse> {
        match self.round_trip(&Request::Status)? {
            Response::Status(status) => Ok(status),
            Response::Error { message } => Err(ClientError::ServerError(message)),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Request graceful shutdown
    pub fn shutdown(&mut self) -> ClientResult<()> {
        match self.round_trip(&Request::Shutdown)? {
            Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::ServerError(message)),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Ping the server
    pub fn ping(&mut self) -> ClientResult<()> {
        match self.round_trip(&Request::Ping)? {
            Response::Pong => Ok(()),
            Response::Error { message } => Err(ClientError::ServerError(message)),
            _ => Err(ClientError::InvalidResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_to_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LookupClient::connect_to(&dir.path().join("nope.sock")).is_none());
    }
}
