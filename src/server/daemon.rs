//! Unix lookup daemon
//!
//! Keeps the word list loaded in memory and serves the lookup endpoint over
//! a Unix socket. The corpus is loaded lazily by the first lookup, like any
//! other caller of the lookup service.

use crate::lookup::LookupService;
use crate::server::protocol::{
    read_message, write_message, AutocompleteResponse, Request, Response, StatusResponse,
};
use crate::server::{get_pid_path, get_socket_path};
use anyhow::{Context, Result};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Idle time after which a client connection is closed
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Statistics for the server
struct ServerStats {
    start_time: Instant,
    queries_served: AtomicU64,
    faults: AtomicU64,
}

impl ServerStats {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            queries_served: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        }
    }
}

/// The lookup daemon
pub struct LookupServer {
    service: Arc<LookupService>,
    /// Server statistics
    stats: ServerStats,
    /// Shutdown flag
    shutdown: AtomicBool,
    idle_timeout: Duration,
}

impl LookupServer {
    /// Create a new server wrapped in Arc
    pub fn new(service: Arc<LookupService>) -> Arc<Self> {
        Self::with_idle_timeout(service, CONNECTION_TIMEOUT)
    }

    /// Create a server that drops connections idle for longer than `idle_timeout`
    pub fn with_idle_timeout(service: Arc<LookupService>, idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            service,
            stats: ServerStats::new(),
            shutdown: AtomicBool::new(false),
            idle_timeout,
        })
    }

    /// Start the server on the per-user socket (blocking)
    pub fn run(self: &Arc<Self>) -> Result<()> {
        self.run_at(&get_socket_path(), Some(&get_pid_path()))
    }

    /// Start the server on an explicit socket (blocking)
    pub fn run_at(self: &Arc<Self>, socket_path: &Path, pid_path: Option<&Path>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Remove stale socket file
        if socket_path.exists() {
            fs::remove_file(socket_path)?;
        }

        if let Some(pid_path) = pid_path {
            fs::write(pid_path, format!("{}", std::process::id()))
                .with_context(|| format!("Failed to write {}", pid_path.display()))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind to {}", socket_path.display()))?;

        // Set socket permissions (user only)
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(socket_path, fs::Permissions::from_mode(0o600))?;
        }

        info!(
            socket = %socket_path.display(),
            word_list = %self.service.settings().word_list_path.display(),
            "lookup daemon listening"
        );

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            match stream {
                Ok(stream) => {
                    let _ = stream.set_read_timeout(Some(self.idle_timeout));
                    let _ = stream.set_write_timeout(Some(self.idle_timeout));

                    let server = Arc::clone(self);
                    let socket_path = socket_path.to_path_buf();
                    thread::spawn(move || {
                        if let Err(e) = server.handle_connection(stream, &socket_path) {
                            debug!(error = %e, "connection closed with error");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                }
            }
        }

        // Cleanup
        let _ = fs::remove_file(socket_path);
        if let Some(pid_path) = pid_path {
            let _ = fs::remove_file(pid_path);
        }
        info!("lookup daemon stopped");

        Ok(())
    }

    /// Handle a single client connection
    fn handle_connection(&self, stream: UnixStream, socket_path: &Path) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        loop {
            let request: Request = match read_message(&mut reader) {
                Ok(req) => req,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    let resp = Response::Error {
                        message: format!("Invalid request: {}", e),
                    };
                    write_message(&mut writer, &resp)?;
                    continue;
                }
                // Timeouts and resets end the connection
                Err(e) => return Err(e.into()),
            };

            let response = self.handle_request(request);
            write_message(&mut writer, &response)?;

            if matches!(response, Response::ShuttingDown) {
                // Wake the accept loop so it observes the flag
                let _ = UnixStream::connect(socket_path);
                break;
            }
        }

        Ok(())
    }

    /// Handle a single request
    pub fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::Autocomplete { q } => self.handle_autocomplete(&q),

            Request::Status => self.handle_status(),

            Request::Shutdown => {
                info!("shutdown requested");
                self.shutdown.store(true, Ordering::Relaxed);
                Response::ShuttingDown
            }

            Request::Ping => Response::Pong,
        }
    }

    fn handle_autocomplete(&self, q: &str) -> Response {
        let start = Instant::now();
        let reply = self.service.autocomplete(q);

        self.stats.queries_served.fetch_add(1, Ordering::Relaxed);
        if !reply.is_success() {
            self.stats.faults.fetch_add(1, Ordering::Relaxed);
        }

        Response::Autocomplete(AutocompleteResponse {
            reply,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    fn handle_status(&self) -> Response {
        let store = self.service.store();
        let settings = self.service.settings();
        let corpus = store.loaded();

        Response::Status(StatusResponse {
            uptime_secs: self.stats.start_time.elapsed().as_secs(),
            word_list: std::path::absolute(&settings.word_list_path)
                .unwrap_or_else(|_| settings.word_list_path.clone()),
            min_query_length: settings.min_query_length,
            max_results: settings.max_autocomplete_results,
            corpus_state: store.phase().as_str().to_string(),
            words_loaded: corpus.as_ref().map(|c| c.len()).unwrap_or(0),
            corpus_reads: store.reads(),
            queries_served: self.stats.queries_served.load(Ordering::Relaxed),
            faults: self.stats.faults.load(Ordering::Relaxed),
            memory_bytes: corpus.as_ref().map(|c| c.memory_bytes()).unwrap_or(0),
            last_error: store.last_error(),
        })
    }
}

/// Daemonize the current process and run the server in the grandchild
pub fn daemonize(service: Arc<LookupService>) -> Result<()> {
    // Fork using double-fork technique for proper daemonization
    match unsafe { libc::fork() } {
        -1 => anyhow::bail!("First fork failed"),
        0 => {
            // Child process: create new session
            if unsafe { libc::setsid() } == -1 {
                anyhow::bail!("setsid failed");
            }

            // Second fork to prevent acquiring a controlling terminal
            match unsafe { libc::fork() } {
                -1 => anyhow::bail!("Second fork failed"),
                0 => {
                    // Grandchild - this becomes the daemon
                    unsafe {
                        libc::close(0);
                        libc::close(1);
                        libc::close(2);

                        // Redirect to /dev/null
                        let null = libc::open(c"/dev/null".as_ptr(), libc::O_RDWR);
                        if null != -1 {
                            libc::dup2(null, 0);
                            libc::dup2(null, 1);
                            libc::dup2(null, 2);
                            if null > 2 {
                                libc::close(null);
                            }
                        }
                    }

                    // Change to root directory to avoid holding mounts.
                    // Callers pass an absolute word list path.
                    let _ = std::env::set_current_dir("/");

                    let server = LookupServer::new(service);
                    if let Err(e) = server.run() {
                        error!(error = %e, "lookup daemon failed");
                    }
                    std::process::exit(0);
                }
                _ => {
                    // First child exits immediately
                    std::process::exit(0);
                }
            }
        }
        _ => {
            // Parent process - wait for first child then exit
            unsafe {
                let mut status: libc::c_int = 0;
                libc::wait(&mut status);
            }
            Ok(())
        }
    }
}

/// Start the daemon in foreground (for debugging)
pub fn run_foreground(service: Arc<LookupService>) -> Result<()> {
    let server = LookupServer::new(service);
    server.run()
}

/// Stop the running daemon
pub fn stop_daemon() -> Result<bool> {
    let pid_path = get_pid_path();

    if !pid_path.exists() {
        return Ok(false);
    }

    let pid_str = fs::read_to_string(&pid_path)?;
    let pid: i32 = pid_str.trim().parse()?;

    // Send SIGTERM
    unsafe {
        if libc::kill(pid, libc::SIGTERM) == 0 {
            // Wait a bit for graceful shutdown
            thread::sleep(Duration::from_millis(500));

            // Check if still running, send SIGKILL if needed
            if libc::kill(pid, 0) == 0 {
                thread::sleep(Duration::from_secs(1));
                if libc::kill(pid, 0) == 0 {
                    libc::kill(pid, libc::SIGKILL);
                }
            }
        }
    }

    // Clean up socket and pid files
    let _ = fs::remove_file(get_socket_path());
    let _ = fs::remove_file(&pid_path);

    Ok(true)
}
