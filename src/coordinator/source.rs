//! Request/response boundary between the coordinator and a lookup service

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::lookup::{EndpointReply, LookupService, ResultEnvelope};
use crate::server::protocol::AutocompleteResponse;
use crate::server::{ClientError, LookupClient};

/// Shared abort flag for one dispatched request
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Transport-level failure of a suggestion request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request aborted")]
    Aborted,

    #[error("lookup failed (status {0})")]
    Status(u16),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Anything that can answer a raw query with suggestions.
///
/// Implementations run on worker threads. They may check the token to give
/// up early, but the coordinator never relies on that: stale replies are
/// dropped by generation regardless.
pub trait SuggestionSource: Send + Sync {
    fn fetch(&self, query: &str, token: &CancelToken) -> Result<ResultEnvelope, FetchError>;

    /// Short label for status lines
    fn label(&self) -> &'static str;
}

fn accept_reply(reply: EndpointReply) -> Result<ResultEnvelope, FetchError> {
    if reply.is_success() {
        Ok(reply.body.into())
    } else {
        Err(FetchError::Status(reply.status))
    }
}

/// In-process lookup service
pub struct LocalSource {
    service: Arc<LookupService>,
}

impl LocalSource {
    pub fn new(service: Arc<LookupService>) -> Self {
        Self { service }
    }
}

impl SuggestionSource for LocalSource {
    fn fetch(&self, query: &str, token: &CancelToken) -> Result<ResultEnvelope, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::Aborted);
        }
        let reply = self.service.autocomplete(query);
        if token.is_cancelled() {
            return Err(FetchError::Aborted);
        }
        accept_reply(reply)
    }

    fn label(&self) -> &'static str {
        "local"
    }
}

/// Lookup daemon over its Unix socket.
///
/// The daemon closes idle connections, so a request that fails at the
/// transport level reconnects and is sent once more.
pub struct DaemonSource {
    socket_path: PathBuf,
    client: Mutex<Option<LookupClient>>,
}

impl DaemonSource {
    pub fn new(socket_path: impl Into<PathBuf>, client: LookupClient) -> Self {
        Self {
            socket_path: socket_path.into(),
            client: Mutex::new(Some(client)),
        }
    }

    fn autocomplete(
        &self,
        slot: &mut Option<LookupClient>,
        query: &str,
    ) -> Result<AutocompleteResponse, ClientError> {
        if slot.is_none() {
            *slot = LookupClient::connect_to(&self.socket_path);
        }
        let client = slot.as_mut().ok_or(ClientError::NotRunning)?;
        client.autocomplete(query)
    }
}

impl SuggestionSource for DaemonSource {
    fn fetch(&self, query: &str, token: &CancelToken) -> Result<ResultEnvelope, FetchError> {
        // One connection, so requests queue here; a superseded request
        // that is still waiting gives up without touching the socket
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            return Err(FetchError::Aborted);
        }

        let response = match self.autocomplete(&mut slot, query) {
            Err(ClientError::IoError(e)) => {
                debug!(error = %e, "daemon connection lost, reconnecting");
                *slot = None;
                self.autocomplete(&mut slot, query)
            }
            other => other,
        };
        if matches!(response, Err(ClientError::IoError(_))) {
            *slot = None;
        }
        accept_reply(response?.reply)
    }

    fn label(&self) -> &'static str {
        "daemon"
    }
}
